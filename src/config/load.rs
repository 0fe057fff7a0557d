use std::{env, path::PathBuf};

use super::schema::{Settings, SourceKind};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `VAULT__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("VAULT")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.ttl_secs == 0 {
            return Err("cache.ttl_secs must be >= 1".to_string());
        }
        if self.cache.key.trim().is_empty() {
            return Err("cache.key must not be empty".to_string());
        }
        if self.parser.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err("parser.extensions must list at least one extension".to_string());
        }
        if !(self.player.volume_step > 0.0 && self.player.volume_step <= 1.0) {
            return Err("player.volume_step must be in (0, 1]".to_string());
        }
        if matches!(self.source.kind, SourceKind::Releases | SourceKind::Contents)
            && (self.source.owner.trim().is_empty() || self.source.repo.trim().is_empty())
        {
            return Err("source.owner and source.repo are required for GitHub sources".to_string());
        }
        if self.contact.cooldown_minutes == 0 {
            return Err("contact.cooldown_minutes must be >= 1".to_string());
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `VAULT_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VAULT_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/vault/config.toml`
/// or `~/.config/vault/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("vault").join("config.toml"))
}

/// Directory for persisted state and logs: `<data_dir>/vault`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vault")
}
