use packeta_client::PacketaOptions;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Carrier credentials; anything missing falls back to `PACKETA_API_KEY` / `PACKETA_API_URL`
    #[serde(default)]
    pub packeta: PacketaOptions,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    9000
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let mode_file = format!("config/{}", run_mode);

        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name(&mode_file).required(false))
                // Not checked in
                .add_source(config::File::with_name("config/local").required(false))
                // e.g. PACKETA_APP__SERVER__PORT=8080
                .add_source(
                    config::Environment::with_prefix("PACKETA_APP").separator("__"),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}
