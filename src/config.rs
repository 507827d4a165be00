use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ServerError;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 8192;

/// Runtime settings for the server.
///
/// Values come from defaults, then an optional YAML file named by
/// `VIGIL_CONFIG`, then individual environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `ip:port` to bind the listener on
    pub listen_addr: String,
    /// End-to-end lifetime limit of a single connection
    pub deadline: Duration,
    /// Worker threads driving the event loop
    pub workers: usize,
    /// Upper bound on the bytes buffered for one request
    pub max_request_bytes: usize,
}

/// On-disk shape of the configuration file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    listen: Option<String>,
    deadline_secs: Option<u64>,
    workers: Option<usize>,
    max_request_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            deadline: DEFAULT_DEADLINE,
            workers: 1,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl Config {
    /// Default settings listening on `bind_address:port`.
    pub fn new(bind_address: &str, port: u16) -> Self {
        let listen_addr = if bind_address.contains(':') && !bind_address.starts_with('[') {
            format!("[{}]:{}", bind_address, port)
        } else {
            format!("{}:{}", bind_address, port)
        };

        Self {
            listen_addr,
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self, ServerError> {
        let mut cfg = match std::env::var("VIGIL_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen) = std::env::var("LISTEN") {
            cfg.listen_addr = listen;
        }
        if let Some(secs) = env_number::<u64>("VIGIL_DEADLINE_SECS")? {
            cfg.deadline = Duration::from_secs(secs);
        }
        if let Some(workers) = env_number::<usize>("VIGIL_WORKERS")? {
            cfg.workers = workers;
        }
        if let Some(limit) = env_number::<usize>("VIGIL_MAX_REQUEST_BYTES")? {
            cfg.max_request_bytes = limit;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a YAML file on top of the defaults.
    ///
    /// A missing file is not an error; a file that exists but does not parse is.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ServerError::Config(format!("{}: {}", path.display(), e)));
            }
        };

        Self::from_yaml(&contents)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ServerError> {
        // An empty document deserializes to unit, not to a map.
        let file: FileConfig = if contents.trim().is_empty() {
            FileConfig::default()
        } else {
            serde_yaml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))?
        };

        let defaults = Self::default();
        let cfg = Self {
            listen_addr: file.listen.unwrap_or(defaults.listen_addr),
            deadline: file
                .deadline_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.deadline),
            workers: file.workers.unwrap_or(defaults.workers),
            max_request_bytes: file.max_request_bytes.unwrap_or(defaults.max_request_bytes),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.deadline.is_zero() {
            return Err(ServerError::Config("deadline must be greater than zero".into()));
        }
        if self.workers == 0 {
            return Err(ServerError::Config("workers must be at least 1".into()));
        }
        if self.max_request_bytes == 0 {
            return Err(ServerError::Config("max_request_bytes must be greater than zero".into()));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ServerError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ServerError::Config(format!("{} is not a valid number: {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_formats_ipv4_and_ipv6() {
        assert_eq!(Config::new("0.0.0.0", 9000).listen_addr, "0.0.0.0:9000");
        assert_eq!(Config::new("::1", 9000).listen_addr, "[::1]:9000");
    }

    #[test]
    fn empty_yaml_is_defaults() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }
}
