use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built frontend (index.html, wasm, css)
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Seed for the synthetic data provider; same seed, same reports
    pub seed: u64,
    pub clients: Vec<String>,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[report]
seed = 42
clients = ["1001", "1002", "1003"]
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `PORT` from the environment overrides `server.port` in both cases.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config()?;
    if let Ok(port) = std::env::var("PORT") {
        config.apply_port_override(&port)?;
    }
    Ok(config)
}

fn read_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

impl Config {
    fn apply_port_override(&mut self, raw: &str) -> anyhow::Result<()> {
        self.server.port = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT value '{raw}': {e}"))?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the static directory from configuration
/// Resolves relative paths relative to the executable directory when it exists there
pub fn get_static_dir(config: &Config) -> PathBuf {
    let dir = Path::new(&config.server.static_dir);

    if dir.is_absolute() {
        return dir.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved = exe_dir.join(dir);
            if resolved.exists() {
                return resolved;
            }
        }
    }

    // Fallback: use relative to current directory
    PathBuf::from(&config.server.static_dir)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    toml::from_str(DEFAULT_CONFIG).unwrap()
}
