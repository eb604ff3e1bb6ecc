use crate::error::AppError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable selecting an optional overlay file (`<name>.yaml`).
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Locate a crate's `config/` directory whether the process runs from the
/// workspace root or from inside the crate.
pub fn configuration_directory(base_path: &Path, crate_dir: &str) -> PathBuf {
    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Load settings from `base.yaml`, an optional environment overlay, then
/// `APP_`-prefixed environment variables (`APP_SECTION__KEY`).
pub fn load_settings<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(true));

    if let Ok(environment) = std::env::var(ENVIRONMENT_VAR) {
        builder = builder.add_source(
            File::from(configuration_directory.join(format!("{}.yaml", environment)))
                .required(false),
        );
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
