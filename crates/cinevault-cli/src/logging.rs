use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives for a verbosity level
///
/// 0 = info, 1 = debug with the HTTP connection internals quieted, 2+ = trace.
fn default_directives(verbose_level: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,reqwest::connect=info",
        _ => "trace",
    }
}

fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    let directives = default_directives(verbose_level, quiet);
    if quiet {
        // -q wins over RUST_LOG
        return EnvFilter::new(directives);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal())
}

/// Split `dir/cinevault.log` into the directory and the rotation prefix `cinevault`
fn rotation_target(log_path: &Path) -> Result<(&Path, &str)> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log file name: {}", log_path.display()))?;
    let prefix = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    Ok((log_dir, prefix))
}

/// Install the global subscriber; logs go to stderr unless `log_file` is set
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let registry = Registry::default().with(build_filter(verbose_level, quiet));
    let json = json_requested();

    let Some(log_path) = log_file else {
        if json {
            registry
                .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        }
        return Ok(());
    };

    let (log_dir, prefix) = rotation_target(log_path)?;
    std::fs::create_dir_all(log_dir)?;
    // Rotated daily: cinevault.2026-10-19, ...
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, prefix);

    if json {
        registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender),
            )
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(0, false), "info");
        assert!(default_directives(1, false).starts_with("debug"));
        assert_eq!(default_directives(3, false), "trace");
        assert_eq!(default_directives(2, true), "error");
    }

    #[test]
    fn test_rotation_target() {
        let (dir, prefix) = rotation_target(Path::new("/var/log/cinevault/cinevault.log")).unwrap();
        assert_eq!(dir, Path::new("/var/log/cinevault"));
        assert_eq!(prefix, "cinevault");

        let (dir, prefix) = rotation_target(Path::new("app")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(prefix, "app");
    }
}
