//! Database descriptors and their resolved form.

use serde::{Deserialize, Serialize};

use crate::secrets::SecretString;
use crate::validation::quantity::Quantity;

/// Database descriptor as declared in the request.
///
/// `image`, `deploymentStrategy` and the probes only apply when the database
/// is deployed alongside the registry. Naming an external `server` switches
/// the database to external mode and requires a credentials secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSpec {
    pub credentials_secret_name: Option<String>,
    pub server: Option<String>,
    pub image: Option<String>,
    pub image_pull_secret_name: Option<String>,
    pub deployment_strategy: Option<String>,
    pub volume_size: Option<String>,
    pub readiness_probe: Option<serde_json::Value>,
    pub liveness_probe: Option<serde_json::Value>,
}

impl DatabaseSpec {
    pub fn with_credentials_secret(mut self, secret_name: impl Into<String>) -> Self {
        self.credentials_secret_name = Some(secret_name.into());
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_volume_size(mut self, volume_size: impl Into<String>) -> Self {
        self.volume_size = Some(volume_size.into());
        self
    }
}

/// Credentials projected from a database secret. Every field is optional;
/// a field is only set when the secret supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_password: Option<SecretString>,
}

/// How the database is provided once the request has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DatabaseDeployment {
    /// Deployed and managed alongside the component.
    #[serde(rename_all = "camelCase")]
    SelfManaged {
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deployment_strategy: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        readiness_probe: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        liveness_probe: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        volume_size: Option<Quantity>,
    },
    /// An existing server; nothing is deployed.
    External { server: String },
}

impl DatabaseDeployment {
    /// Deployment implied by the descriptor alone, before any secret is read.
    pub fn from_spec(spec: &DatabaseSpec) -> Self {
        match spec.server.as_deref().filter(|server| !server.is_empty()) {
            Some(server) => DatabaseDeployment::External { server: server.to_string() },
            None => DatabaseDeployment::SelfManaged {
                image: spec.image.clone(),
                deployment_strategy: spec.deployment_strategy.clone(),
                readiness_probe: spec.readiness_probe.clone(),
                liveness_probe: spec.liveness_probe.clone(),
                volume_size: None,
            },
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, DatabaseDeployment::External { .. })
    }

    pub fn server(&self) -> Option<&str> {
        match self {
            DatabaseDeployment::External { server } => Some(server),
            DatabaseDeployment::SelfManaged { .. } => None,
        }
    }
}

/// Resolved view of one database.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDatabase {
    pub credentials: DatabaseCredentials,
    pub deployment: DatabaseDeployment,
}

impl ResolvedDatabase {
    pub fn from_spec(spec: &DatabaseSpec) -> Self {
        Self {
            credentials: DatabaseCredentials::default(),
            deployment: DatabaseDeployment::from_spec(spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_server_means_external() {
        let spec = DatabaseSpec::default().with_server("db.example.com");
        let deployment = DatabaseDeployment::from_spec(&spec);
        assert!(deployment.is_external());
        assert_eq!(deployment.server(), Some("db.example.com"));
    }

    #[test]
    fn test_self_managed_keeps_deployment_fields() {
        let spec: DatabaseSpec = serde_json::from_str(
            r#"{"image":"postgres:13","deploymentStrategy":"Recreate",
                "readinessProbe":{"tcpSocket":{"port":5432}}}"#,
        )
        .unwrap();
        match DatabaseDeployment::from_spec(&spec) {
            DatabaseDeployment::SelfManaged { image, deployment_strategy, readiness_probe, .. } => {
                assert_eq!(image.as_deref(), Some("postgres:13"));
                assert_eq!(deployment_strategy.as_deref(), Some("Recreate"));
                assert!(readiness_probe.is_some());
            }
            other => panic!("expected self-managed, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_server_is_self_managed() {
        let spec = DatabaseSpec::default().with_server("");
        assert!(!DatabaseDeployment::from_spec(&spec).is_external());
    }

    #[test]
    fn test_deployment_serializes_with_mode_tag() {
        let deployment = DatabaseDeployment::External { server: "db".to_string() };
        let json = serde_json::to_value(deployment).unwrap();
        assert_eq!(json["mode"], "external");
        assert_eq!(json["server"], "db");
    }
}
