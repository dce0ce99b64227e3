use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Where collections, uploads and the frontend bundle live on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Also mount `/save/{data_type}` and `/status`.
    #[serde(default = "default_legacy_routes")]
    pub legacy_routes: bool,
    /// Request body cap for `/api/upload-screenshots`.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Request body cap for collection saves.
    #[serde(default = "default_max_collection_bytes")]
    pub max_collection_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            frontend_dir: default_frontend_dir(),
            uploads_dir: default_uploads_dir(),
            legacy_routes: default_legacy_routes(),
            max_upload_bytes: default_max_upload_bytes(),
            max_collection_bytes: default_max_collection_bytes(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_data_dir() -> String { "data".into() }
fn default_frontend_dir() -> String { "frontend".into() }
fn default_uploads_dir() -> String { "uploads".into() }
fn default_legacy_routes() -> bool { true }
fn default_max_upload_bytes() -> usize { 25 * 1024 * 1024 }
fn default_max_collection_bytes() -> usize { 16 * 1024 * 1024 }

/// Path of the TOML config file, `CONFIG_PATH` or `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults; then env overrides and validation.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if Path::new(&path).exists() { load_from_file(&path)? } else { AppConfig::default() };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override fields from environment-style lookups. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") { self.server.host = host; }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(dir) = lookup("DATA_DIR") { self.storage.data_dir = dir; }
        if let Some(dir) = lookup("FRONTEND_DIR") { self.storage.frontend_dir = dir; }
        if let Some(dir) = lookup("UPLOADS_DIR") { self.storage.uploads_dir = dir; }
        if let Some(flag) = lookup("LEGACY_ROUTES").and_then(|v| parse_flag(&v)) {
            self.storage.legacy_routes = flag;
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.storage.max_upload_bytes = limit;
        }
        if let Some(limit) = lookup("MAX_COLLECTION_BYTES").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.storage.max_collection_bytes = limit;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, dir) in [
            ("storage.data_dir", &self.data_dir),
            ("storage.frontend_dir", &self.frontend_dir),
            ("storage.uploads_dir", &self.uploads_dir),
        ] {
            if dir.trim().is_empty() {
                return Err(anyhow!("{name} must not be empty"));
            }
        }
        for (name, limit) in [
            ("storage.max_upload_bytes", self.max_upload_bytes),
            ("storage.max_collection_bytes", self.max_collection_bytes),
        ] {
            if limit == 0 {
                return Err(anyhow!("{name} must be positive"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_deployment() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.data_dir, "data");
        assert!(cfg.storage.legacy_routes);
        assert_eq!(cfg.storage.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(cfg.storage.max_collection_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn partial_toml_keeps_defaults() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [storage]
            data_dir = "/var/lib/game"
            "#,
        )?;
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.data_dir, "/var/lib/game");
        assert_eq!(cfg.storage.uploads_dir, "uploads");
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("PORT", "7001"),
            ("DATA_DIR", "/tmp/game-data"),
            ("LEGACY_ROUTES", "off"),
            ("TOKIO_WORKER_THREADS", "not-a-number"),
            ("MAX_COLLECTION_BYTES", "4096"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.server.port, 7001);
        assert_eq!(cfg.storage.data_dir, "/tmp/game-data");
        assert!(!cfg.storage.legacy_routes);
        assert_eq!(cfg.server.worker_threads, None);
        assert_eq!(cfg.storage.max_collection_bytes, 4096);
        assert_eq!(cfg.storage.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.data_dir = "  ".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.max_collection_bytes = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.host = String::new();
        cfg.server.worker_threads = Some(0);
        assert!(cfg.normalize_and_validate().is_ok());
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.worker_threads, None);
    }
}
