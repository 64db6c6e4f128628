//! Settings for the `expenses` binary.
//!
//! Values are read from an optional `settings.toml` next to the binary and
//! can be overridden with `EXPENSES__<SECTION>__<KEY>` environment variables,
//! e.g. `EXPENSES__DATABASE__URL` or `EXPENSES__DEFAULTS__CATEGORIES=Food,Rent`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use store::StoreDefaults;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./expenses.db?mode=rwc";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    #[serde(default)]
    pub defaults: StoreDefaults,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("EXPENSES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("defaults.categories"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
