//! Runtime configuration for the engine and the HTTP server.

use als::AlsConfig;
use std::path::PathBuf;

/// Query thresholds and model hyperparameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub als: AlsConfig,
    /// Top queries keep predictions at or above this value
    pub top_min_nbr_success: f32,
    /// Last queries keep predictions strictly below this value
    pub last_max_nbr_success: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            als: AlsConfig::default(),
            top_min_nbr_success: 50.0,
            last_max_nbr_success: 20.0,
        }
    }
}

/// Where to bind and which dataset to serve
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding creatives_rating.csv and creatives.csv
    pub dataset_path: PathBuf,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            dataset_path: PathBuf::from("datasets"),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.engine.top_min_nbr_success, 50.0);
        assert_eq!(config.engine.last_max_nbr_success, 20.0);
        assert_eq!(config.engine.als, AlsConfig::default());
    }
}
