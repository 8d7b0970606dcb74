use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://testapi.getlokalapp.com";
pub const DEFAULT_PAGE_THRESHOLD: usize = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: Api,
    pub storage: Storage,
    pub listing: Listing,
    pub log: Log,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Api {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Storage {
    /// Directory holding one file per storage key.
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Listing {
    /// Pages shorter than this mean there is nothing left to load.
    pub page_threshold: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    pub filter: String,
}

/// Load settings from `config/default.toml`, `config/<env>.toml`, and env overrides.
pub fn load() -> Result<Settings, ConfigError> {
    load_from(Path::new("config"))
}

/// Same as [`load`] with an explicit config directory. Both files are optional;
/// built-in defaults fill whatever they leave out.
pub fn load_from(dir: &Path) -> Result<Settings, ConfigError> {
    let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    let file = |name: &str| {
        config::File::with_name(&dir.join(name).to_string_lossy()).required(false)
    };

    config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("storage.data_dir", "data")?
        .set_default("listing.page_threshold", DEFAULT_PAGE_THRESHOLD as i64)?
        .set_default("log.filter", "info")?
        .add_source(file("default"))
        .add_source(file(&env_name))
        .add_source(config::Environment::with_prefix("JOBS").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_from(dir.path()).unwrap();

        assert_eq!(settings.listing.page_threshold, DEFAULT_PAGE_THRESHOLD);
        assert_eq!(settings.storage.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_default_file_overrides_builtins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[api]\nbase_url = \"http://localhost:9000\"\n\n[listing]\npage_threshold = 20\n",
        )
        .unwrap();

        let settings = load_from(dir.path()).unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:9000");
        assert_eq!(settings.listing.page_threshold, 20);
        assert_eq!(settings.log.filter, "info");
    }
}
