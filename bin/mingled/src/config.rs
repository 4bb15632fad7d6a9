//! Server configuration.
//!
//! Loaded from a TOML file resolved from a context name
//! (`/etc/mingle/<name>.toml`) or a direct path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

/// JWT signing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC signing secret. Must be non-empty.
    pub secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

fn default_expire_secs() -> i64 {
    86400
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base directory for all persistent state.
    pub data_dir: String,
}

impl ServerConfig {
    /// Resolve a context name or path into a config file path.
    ///
    /// A bare name maps to `/etc/mingle/<name>.toml`; anything with a
    /// `/` or `.` is treated as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/mingle/{}.toml", name_or_path))
        }
    }

    /// Load and parse a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
        config.verify()?;
        Ok(config)
    }

    /// Reject configurations that cannot possibly work.
    fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("jwt.secret must not be empty");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("storage.data_dir must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/mingle/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/opt/mingle.toml"),
            PathBuf::from("/opt/mingle.toml")
        );
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[jwt]
secret = "test-secret"

[storage]
data_dir = "/tmp/mingle"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.jwt.secret, "test-secret");
        assert_eq!(config.jwt.expire_secs, 86400); // default
        assert_eq!(config.storage.data_dir, "/tmp/mingle");
    }

    #[test]
    fn test_load_rejects_empty_secret() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[jwt]
secret = ""

[storage]
data_dir = "/tmp/mingle"
"#
        )
        .unwrap();

        assert!(ServerConfig::load(file.path()).is_err());
    }
}
