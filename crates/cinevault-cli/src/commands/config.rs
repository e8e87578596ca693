use super::context::{load_config, load_secrets};
use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use cinevault_config::{Config, PathManager, API_KEY_ENV};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::SetApiKey { key } => set_api_key(key, output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();
    let config = load_config(&paths)?;
    let secrets = load_secrets(&paths)?;

    let key_source = if std::env::var(API_KEY_ENV).map(|k| !k.trim().is_empty()).unwrap_or(false) {
        API_KEY_ENV
    } else if secrets.get_catalog_api_key().is_some() {
        "secrets.toml"
    } else {
        "not set"
    };
    let api_key = secrets
        .resolve_catalog_api_key()
        .map(|k| if full { k } else { mask_string(&k) })
        .unwrap_or_else(|| "<not set>".to_string());
    let store_dir = config
        .storage
        .dir
        .as_ref()
        .map(|d| d.join("store"))
        .unwrap_or_else(|| paths.store_dir());

    output.data(
        &json!({
            "config_file": config_file,
            "config_file_exists": config_file.exists(),
            "store_dir": store_dir,
            "log_file": paths.log_file(),
            "api_key": api_key,
            "api_key_source": key_source,
            "config": config,
        }),
        || {
            if !config_file.exists() {
                println!(
                    "{} No config file at {}; showing defaults. Run `cinevault config init` to write one.",
                    "⚠".yellow(),
                    config_file.display()
                );
                println!();
            }

            let mut files = Table::new();
            files.load_preset(comfy_table::presets::UTF8_FULL);
            files.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            files.set_header(vec![
                Cell::new("Files").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            files.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
            files.add_row(vec![Cell::new("Data store"), Cell::new(store_dir.display())]);
            files.add_row(vec![Cell::new("Log file"), Cell::new(paths.log_file().display())]);
            println!("{}", files);

            let catalog = &config.catalog;
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            table.set_header(vec![
                Cell::new("Catalog").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            table.add_row(vec![Cell::new("Base URL"), Cell::new(&catalog.base_url)]);
            table.add_row(vec![Cell::new("Host"), Cell::new(&catalog.host)]);
            table.add_row(vec![Cell::new("API key"), Cell::new(format!("{} ({})", api_key, key_source))]);
            table.add_row(vec![Cell::new("Popular limit"), Cell::new(catalog.popular_limit)]);
            table.add_row(vec![Cell::new("Cache TTL"), Cell::new(format!("{}s", catalog.cache_ttl_secs))]);
            table.add_row(vec![
                Cell::new("Request timeout"),
                Cell::new(
                    catalog
                        .request_timeout_secs
                        .map(|s| format!("{}s", s))
                        .unwrap_or_else(|| "none".to_string()),
                ),
            ]);
            println!("{}", table);
        },
    );
    Ok(())
}

fn set_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

    let key = match key {
        Some(key) => key,
        None => prompts::prompt_password("RapidAPI key for imdb8", false)?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let mut secrets = load_secrets(&paths)?;
    secrets.set_catalog_api_key(key.clone());
    secrets
        .save()
        .map_err(|e| eyre!("Failed to save secrets to {}: {}", paths.secrets_file().display(), e))?;

    output.success(format!("Saved API key {}", mask_string(&key)));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the saved key", API_KEY_ENV));
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();

    if config_file.exists() && !force {
        let overwrite = output.is_human()
            && prompts::prompt_yes_no(
                &format!("{} already exists. Replace it with defaults?", config_file.display()),
                false,
            )?;
        if !overwrite {
            output.info(format!("Kept existing configuration at {}", config_file.display()));
            return Ok(());
        }
    }

    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("abcdef123456"), "ab***56");
        assert_eq!(mask_string("ключ-секрет"), "кл***ет");
    }
}
