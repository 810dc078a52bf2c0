use packeta_core::Masked;
use serde::Deserialize;
use url::Url;

/// Prefix of the environment variables consulted when an option is not given
/// explicitly: `PACKETA_API_KEY` and `PACKETA_API_URL`.
pub const ENV_PREFIX: &str = "PACKETA";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Packeta API configuration missing. Please provide api_key and api_url in options or set PACKETA_API_KEY and PACKETA_API_URL environment variables.")]
    Missing,

    #[error("Packeta API URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("Packeta API key cannot be used in an Authorization header")]
    InvalidApiKey,

    #[error("Failed to read Packeta configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Failed to build Packeta HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Carrier options as handed to the service constructor. Anything left out
/// here is looked up in the process environment by [`PacketaOptions::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacketaOptions {
    #[serde(default)]
    pub api_key: Option<Masked<String>>,
    #[serde(default)]
    pub api_url: Option<String>,
}

impl PacketaOptions {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(Masked::new(api_key.into())),
            api_url: Some(api_url.into()),
        }
    }

    /// Resolve once against `PACKETA_*` environment variables. Explicit,
    /// non-empty options win over the environment.
    pub fn resolve(self) -> Result<PacketaConfig, ConfigurationError> {
        self.resolve_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as [`resolve`](Self::resolve) with an explicit variable source
    pub fn resolve_from(
        self,
        environment: config::Environment,
    ) -> Result<PacketaConfig, ConfigurationError> {
        let settings = config::Config::builder()
            .add_source(environment)
            .set_override_option("api_key", non_empty(self.api_key.map(Masked::into_inner)))?
            .set_override_option("api_url", non_empty(self.api_url))?
            .build()?;

        let resolved: PacketaOptions = settings.try_deserialize()?;

        match (
            non_empty(resolved.api_key.map(Masked::into_inner)),
            non_empty(resolved.api_url),
        ) {
            (Some(api_key), Some(api_url)) => PacketaConfig::new(api_key, &api_url),
            _ => Err(ConfigurationError::Missing),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fully resolved carrier configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct PacketaConfig {
    pub api_key: Masked<String>,
    pub api_url: Url,
}

impl PacketaConfig {
    pub fn new(api_key: impl Into<String>, api_url: &str) -> Result<Self, ConfigurationError> {
        let api_url = match Url::parse(api_url.trim()) {
            Ok(url) => url,
            Err(e) => {
                let reason = format!("{}: {}", api_url, e);
                return Err(ConfigurationError::InvalidUrl(reason));
            }
        };

        if api_url.cannot_be_a_base() || !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidUrl(api_url.to_string()));
        }

        Ok(Self {
            api_key: Masked::new(api_key.into()),
            api_url,
        })
    }
}
