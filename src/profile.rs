//! Connection profiles and comparison requests

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{DriftError, Result};

/// How to reach one database
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Display name; used as the target label in reports
    #[serde(default)]
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Environment variable holding the password when `password` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

fn default_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

impl ConnectionProfile {
    pub fn new(name: impl Into<String>, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: default_port(),
            database: database.into(),
            user: default_user(),
            password: None,
            password_env: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = Some(password.into());
        self
    }

    /// Label identifying this profile in reports and errors.
    ///
    /// Falls back to `host:port/database` for unnamed profiles.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.address()
        } else {
            self.name.clone()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }

    /// Password to authenticate with, consulting `password_env` if needed
    pub fn resolved_password(&self) -> Option<String> {
        self.password.clone().or_else(|| {
            self.password_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
        })
    }

    /// Check the fields needed to connect
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DriftError::InvalidRequest(format!(
                "profile '{}' has no host",
                self.label()
            )));
        }
        if self.database.trim().is_empty() {
            return Err(DriftError::InvalidRequest(format!(
                "profile '{}' has no database",
                self.label()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("password_env", &self.password_env)
            .finish()
    }
}

/// One source and the ordered targets to check against it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub source: Option<ConnectionProfile>,
    #[serde(default)]
    pub targets: Vec<ConnectionProfile>,
}

impl ComparisonRequest {
    pub fn new(source: ConnectionProfile, targets: Vec<ConnectionProfile>) -> Self {
        Self {
            source: Some(source),
            targets,
        }
    }

    /// Reject malformed requests before any I/O happens
    pub fn validate(&self) -> Result<&ConnectionProfile> {
        let source = self.source.as_ref().ok_or_else(|| {
            DriftError::InvalidRequest("no source connection provided".to_string())
        })?;
        validate_profiles(source, &self.targets)?;
        Ok(source)
    }
}

/// Check a source and its targets: at least one target, connectable
/// profiles, and target labels unique within the run
pub fn validate_profiles(source: &ConnectionProfile, targets: &[ConnectionProfile]) -> Result<()> {
    if targets.is_empty() {
        return Err(DriftError::InvalidRequest(
            "no target connections provided".to_string(),
        ));
    }

    source.validate()?;
    let mut labels = HashSet::new();
    for target in targets {
        target.validate()?;
        let label = target.label();
        if !labels.insert(label.clone()) {
            return Err(DriftError::InvalidRequest(format!(
                "duplicate target label '{}'",
                label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_address() {
        let named = ConnectionProfile::new("staging", "db1", "shop");
        assert_eq!(named.label(), "staging");

        let unnamed = ConnectionProfile::new("", "db1", "shop").with_port(3307);
        assert_eq!(unnamed.label(), "db1:3307/shop");
    }

    #[test]
    fn test_debug_redacts_password() {
        let profile = ConnectionProfile::new("prod", "db", "shop").with_credentials("app", "hunter2");
        let debug = format!("{:?}", profile);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let profile = ConnectionProfile::new("prod", "db", "shop").with_credentials("app", "hunter2");
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_request_requires_source_and_targets() {
        let request = ComparisonRequest::default();
        assert!(matches!(request.validate(), Err(DriftError::InvalidRequest(_))));

        let request = ComparisonRequest::new(ConnectionProfile::new("a", "h", "d"), vec![]);
        assert!(matches!(request.validate(), Err(DriftError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_rejects_duplicate_labels() {
        let request = ComparisonRequest::new(
            ConnectionProfile::new("src", "h", "d"),
            vec![
                ConnectionProfile::new("replica", "h1", "d"),
                ConnectionProfile::new("replica", "h2", "d"),
            ],
        );
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate target label"));
    }

    #[test]
    fn test_request_rejects_missing_database() {
        let request = ComparisonRequest::new(
            ConnectionProfile::new("src", "h", "d"),
            vec![ConnectionProfile::new("t", "h", " ")],
        );
        assert!(matches!(request.validate(), Err(DriftError::InvalidRequest(_))));
    }
}
