use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret used to verify bearer tokens issued by the identity
    /// provider. Token issuance itself lives outside this service.
    pub token_secret: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportConfig {
    /// Directories searched for the Liberation font family used by the
    /// PDF renderer. The first directory containing the fonts wins.
    #[serde(default = "default_font_dirs")]
    pub font_dirs: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            font_dirs: default_font_dirs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_font_dirs() -> Vec<String> {
    [
        "/usr/share/fonts/liberation",
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/liberation-fonts",
        "/usr/local/share/fonts/liberation",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_secret.len() < 32 {
            return Err(ConfigError::Validation(
                "auth.token_secret must be at least 32 characters".into(),
            ));
        }
        if self.database_url.is_empty() {
            return Err(ConfigError::Validation(
                "database_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching a key path with `__` separators
/// (e.g. `AUTH__TOKEN_SECRET`) overrides the file value.
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;

    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
