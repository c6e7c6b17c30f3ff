//! Daemon configuration
//!
//! Loaded from an optional TOML file; every key has a default, and command
//! line flags override whatever the file says.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ims_api::StaticFiles;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5050,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// XML-RPC endpoint
    pub url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/".to_string(),
            timeout_secs: ims_rpc::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: ims_rpc::DEFAULT_CONNECT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticFilesConfig {
    pub dir: PathBuf,
    pub index: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(ims_api::spa::DEFAULT_STATIC_DIR),
            index: PathBuf::from(ims_api::spa::DEFAULT_INDEX),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub backend_url: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.backend_url {
            self.backend.url = url;
        }
        if let Some(dir) = overrides.static_dir {
            self.static_files.dir = dir;
        }
        self
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind, self.server.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.connect_timeout_secs)
    }

    pub fn static_files(&self) -> StaticFiles {
        StaticFiles::new(&self.static_files.dir).with_index(&self.static_files.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:5050");
        assert_eq!(config.backend.url, "http://localhost:8000/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.static_files().index_path(),
            PathBuf::from("dist/index.html")
        );
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080

            [backend]
            url = "http://rpc.internal:9000/"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.backend.url, "http://rpc.internal:9000/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[server]\nprot = 1\n").is_err());
    }

    #[test]
    fn overrides_win() {
        let config = Config::parse("[server]\nport = 8080\n[static_files]\ndir = \"web\"\n")
            .unwrap()
            .apply(Overrides {
                port: Some(9090),
                backend_url: Some("http://other:8000/".into()),
                static_dir: None,
            });

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.backend.url, "http://other:8000/");
        assert_eq!(config.static_files.dir, PathBuf::from("web"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imsd.toml");
        std::fs::write(
            &path,
            "[server]\nbind = \"127.0.0.1\"\n[static_files]\nindex = \"app.html\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:5050");
        assert_eq!(
            config.static_files().index_path(),
            PathBuf::from("dist/app.html")
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/imsd.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/imsd.toml"));
    }
}
