use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment prefix for overrides, e.g. `ODDS_HEDGE_SEARCH__ORDER=ascending`.
pub const ENV_PREFIX: &str = "ODDS_HEDGE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, the TOML file and environment variables.
    ///
    /// A missing file is not an error; the defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");

        let config: AppConfig = Self::base(path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Loads configuration with a profile file (`Config.<profile>.toml`) layered
    /// over the base file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        let path = path.as_ref();
        let profile_path = profile_file(path, profile);
        debug!(
            path = %path.display(),
            profile_path = %profile_path.display(),
            "Loading configuration with profile"
        );

        let config: AppConfig = Self::base(path)
            .merge(Toml::file(&profile_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration for profile {profile}"))?;

        Ok(config)
    }

    fn base(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
    }
}

fn profile_file(base: &Path, profile: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Config");
    base.with_file_name(format!("{stem}.{profile}.toml"))
}
