// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-config
//!
//! TOML loading for the two configuration documents a run needs: the
//! global config (every known client plus the server under test) and the
//! run config (which procedure, which clients, which protocol target).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use cactus_error::ConfigKind;
use cactus_model::{ClientConfig, ServerConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a harness instance knows about before a run is chosen:
/// every configured client and the server under test.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GlobalConfig {
    /// Every client this harness instance can act as.
    pub clients: Vec<ClientConfig>,
    /// The server under test.
    pub server: ServerConfig,
}

impl GlobalConfig {
    /// Look up one of this config's clients by alias.
    #[must_use]
    pub fn client(&self, alias: &str) -> Option<&ClientConfig> {
        self.clients.iter().find(|c| c.id == alias)
    }
}

/// Per-invocation choices for a single test run, as surfaced on the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunConfig {
    /// Which test procedure to execute.
    pub test_procedure_id: String,
    /// Aliases (from [`GlobalConfig::clients`]) participating in this run.
    pub client_aliases: Vec<String>,
    /// Target protocol minor version (recorded in the run's `.versions` file).
    pub protocol_minor_version: String,
    /// Suppresses any interactive UI during the run.
    #[serde(default)]
    pub headless: bool,
}

/// Load and semantically validate a [`GlobalConfig`] from a TOML file.
///
/// Validates that every referenced certificate/key file exists, returning
/// [`ConfigKind::MissingCredential`] for the first one that doesn't.
///
/// # Errors
///
/// [`ConfigKind::FileNotFound`] if `path` can't be read; [`ConfigKind::Invalid`]
/// if the content isn't valid TOML or doesn't match the expected shape;
/// [`ConfigKind::MissingCredential`] if a client's cert/key file is absent.
pub fn load_global_config(path: &Path) -> Result<GlobalConfig, ConfigKind> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigKind::FileNotFound { path: path.display().to_string() })?;
    let config: GlobalConfig = toml::from_str(&content).map_err(|e| ConfigKind::Invalid { reasons: vec![e.to_string()] })?;
    validate_global_config(&config)?;
    Ok(config)
}

/// Validate an already-parsed [`GlobalConfig`] without touching the
/// filesystem for anything but the referenced credential files.
///
/// # Errors
///
/// [`ConfigKind::Invalid`] if client aliases are duplicated or empty;
/// [`ConfigKind::MissingCredential`] if a cert/key file is absent.
pub fn validate_global_config(config: &GlobalConfig) -> Result<(), ConfigKind> {
    let mut reasons = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    for client in &config.clients {
        if client.id.trim().is_empty() {
            reasons.push("client id must not be empty".to_string());
        } else if !seen.insert(client.id.clone()) {
            reasons.push(format!("duplicate client id {}", client.id));
        }
    }
    if !reasons.is_empty() {
        return Err(ConfigKind::Invalid { reasons });
    }
    for client in &config.clients {
        if !client.cert_path.is_file() {
            return Err(ConfigKind::MissingCredential { path: client.cert_path.display().to_string() });
        }
        if !client.key_path.is_file() {
            return Err(ConfigKind::MissingCredential { path: client.key_path.display().to_string() });
        }
    }
    Ok(())
}

/// Parse a [`RunConfig`] from a TOML string (as handed in on the CLI via
/// `--run-config`, or inlined by a caller that already has the document).
///
/// # Errors
///
/// [`ConfigKind::Invalid`] if the content isn't valid TOML or doesn't match
/// the expected shape, or if `client_aliases` is empty.
pub fn parse_run_config(content: &str) -> Result<RunConfig, ConfigKind> {
    let config: RunConfig = toml::from_str(content).map_err(|e| ConfigKind::Invalid { reasons: vec![e.to_string()] })?;
    if config.client_aliases.is_empty() {
        return Err(ConfigKind::Invalid { reasons: vec!["run config must name at least one client alias".to_string()] });
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::Role;
    use std::io::Write;

    fn sample_client(id: &str, cert_path: std::path::PathBuf, key_path: std::path::PathBuf) -> ClientConfig {
        ClientConfig {
            id: id.to_string(),
            role: Role::Device,
            cert_path,
            key_path,
            lfdi: "AB".repeat(20),
            pen: 1,
            pin: 1234,
            nominal_max_watts: 5000,
            user_agent: None,
        }
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    #[test]
    fn load_global_config_rejects_missing_file() {
        let err = load_global_config(Path::new("/nonexistent/cactus.toml")).unwrap_err();
        assert!(matches!(err, ConfigKind::FileNotFound { .. }));
    }

    #[test]
    fn validate_global_config_rejects_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("missing-cert.pem");
        let key = write_temp(&dir, "key.pem", b"key");
        let config = GlobalConfig {
            clients: vec![sample_client("client-1", cert, key)],
            server: ServerConfig {
                device_capability_uri: "https://example.test/dcap".into(),
                verify_hostname: true,
                trust_anchor_path: None,
                notification_collector_uri: "https://collector.test".into(),
                server_pen: 1,
                refetch_delay: std::time::Duration::from_millis(100),
            },
        };
        let err = validate_global_config(&config).unwrap_err();
        assert!(matches!(err, ConfigKind::MissingCredential { .. }));
    }

    #[test]
    fn validate_global_config_rejects_duplicate_alias() {
        let dir = tempfile::tempdir().unwrap();
        let cert = write_temp(&dir, "cert.pem", b"cert");
        let key = write_temp(&dir, "key.pem", b"key");
        let config = GlobalConfig {
            clients: vec![sample_client("client-1", cert.clone(), key.clone()), sample_client("client-1", cert, key)],
            server: ServerConfig {
                device_capability_uri: "https://example.test/dcap".into(),
                verify_hostname: true,
                trust_anchor_path: None,
                notification_collector_uri: "https://collector.test".into(),
                server_pen: 1,
                refetch_delay: std::time::Duration::from_millis(100),
            },
        };
        let err = validate_global_config(&config).unwrap_err();
        assert!(matches!(err, ConfigKind::Invalid { .. }));
    }

    #[test]
    fn load_global_config_accepts_valid_toml_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cert = write_temp(&dir, "cert.pem", b"cert");
        let key = write_temp(&dir, "key.pem", b"key");
        let toml_content = format!(
            r#"
            [[clients]]
            id = "client-1"
            role = "device"
            cert_path = "{}"
            key_path = "{}"
            lfdi = "{}"
            pen = 1
            pin = 1234
            nominal_max_watts = 5000

            [server]
            device_capability_uri = "https://example.test/dcap"
            notification_collector_uri = "https://collector.test"
            server_pen = 1
            refetch_delay = 100
            "#,
            cert.display(),
            key.display(),
            "AB".repeat(20),
        );
        let config_path = write_temp(&dir, "cactus.toml", toml_content.as_bytes());
        let config = load_global_config(&config_path).unwrap();
        assert_eq!(config.clients.len(), 1);
        assert!(config.client("client-1").is_some());
        assert!(config.client("nope").is_none());
    }

    #[test]
    fn parse_run_config_requires_at_least_one_client_alias() {
        let toml_content = "test_procedure_id = \"p1\"\nclient_aliases = []\nprotocol_minor_version = \"1.3\"\n";
        let err = parse_run_config(toml_content).unwrap_err();
        assert!(matches!(err, ConfigKind::Invalid { .. }));
    }

    #[test]
    fn parse_run_config_parses_valid_toml() {
        let toml_content = r#"
            test_procedure_id = "p1"
            client_aliases = ["client-1"]
            protocol_minor_version = "1.3-beta/storage"
            headless = true
        "#;
        let config = parse_run_config(toml_content).unwrap();
        assert_eq!(config.test_procedure_id, "p1");
        assert!(config.headless);
    }
}
