use crate::output::Output;
use cinevault_config::{Config, PathManager, SecretStore};
use cinevault_core::{App, AppEvent};
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub fn load_secrets(paths: &PathManager) -> Result<SecretStore> {
    let secrets_file = paths.secrets_file();
    let mut secrets = SecretStore::new(secrets_file.clone());
    secrets
        .load()
        .map_err(|e| eyre!("Failed to load secrets from {}: {}", secrets_file.display(), e))?;
    Ok(secrets)
}

/// Open the application with persisted state loaded
///
/// Storage failures that the managers swallow are still shown to the user.
pub async fn open_app(output: &Output) -> Result<App> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let secrets = load_secrets(&paths)?;

    let app = App::open(&config, &paths, secrets.resolve_catalog_api_key()).await?;

    let out = *output;
    app.events().subscribe(move |event| {
        if let AppEvent::PersistFailed { key, error } = event {
            out.warn(format!(
                "Could not save {}: {}. The change only lasts until this command exits.",
                key, error
            ));
        }
    });

    Ok(app)
}

/// The signed-in user, or an error telling how to sign in
pub fn require_session(app: &App) -> Result<String> {
    app.session()
        .current_user()
        .ok_or_else(|| eyre!("Not signed in. Run `cinevault login` or `cinevault register` first."))
}
