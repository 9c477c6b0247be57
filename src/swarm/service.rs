//! Swarm service objects as returned by the service list endpoint

use super::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label carrying the stack a service was deployed from
pub const STACK_NAMESPACE_LABEL: &str = "com.docker.stack.namespace";

/// Swarm service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    /// Service ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Object version
    #[serde(default)]
    pub version: Version,
    /// Created timestamp
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    /// Service specification
    #[serde(default)]
    pub spec: ServiceSpec,
    /// Service endpoint
    #[serde(default)]
    pub endpoint: Endpoint,
}

impl Service {
    /// The scheduling mode, if it is one we know how to display
    pub fn mode(&self) -> Option<ServiceMode> {
        let mode = &self.spec.mode;
        if let Some(replicated) = &mode.replicated {
            return replicated
                .replicas
                .map(|replicas| ServiceMode::Replicated { replicas });
        }
        mode.global.as_ref().map(|_| ServiceMode::Global)
    }

    /// Container image of the task template
    pub fn image(&self) -> &str {
        self.spec
            .task_template
            .container_spec
            .as_ref()
            .map(|c| c.image.as_str())
            .unwrap_or_default()
    }

    /// Per-node replica cap from the placement constraints
    pub fn max_replicas(&self) -> u64 {
        self.spec
            .task_template
            .placement
            .as_ref()
            .and_then(|p| p.max_replicas)
            .unwrap_or(0)
    }
}

/// Service scheduling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    /// Fixed number of tasks spread over the cluster
    Replicated { replicas: u64 },
    /// One task per eligible node
    Global,
}

impl std::fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceMode::Replicated { .. } => write!(f, "replicated"),
            ServiceMode::Global => write!(f, "global"),
        }
    }
}

/// Service specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSpec {
    /// Service name
    #[serde(default)]
    pub name: String,
    /// Labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Task template
    #[serde(default)]
    pub task_template: TaskSpec,
    /// Service mode
    #[serde(default)]
    pub mode: ServiceModeSpec,
}

/// Wire form of the service mode; exactly one member is set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceModeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicated: Option<ReplicatedService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalService>,
}

/// Replicated mode parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicatedService {
    pub replicas: Option<u64>,
}

/// Global mode marker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalService {}

/// Task template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpec {
    /// Container spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_spec: Option<ContainerSpec>,
    /// Placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

/// Container specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    /// Image
    #[serde(default)]
    pub image: String,
}

/// Placement configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    /// Constraints
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Max replicas per node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<u64>,
}

/// Port protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// Port publish mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Published through the routing mesh
    #[default]
    Ingress,
    /// Published directly on the node running the task
    Host,
}

/// Port configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortConfig {
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Protocol
    #[serde(default)]
    pub protocol: Protocol,
    /// Target port
    #[serde(default)]
    pub target_port: u32,
    /// Published port
    #[serde(default)]
    pub published_port: u32,
    /// Publish mode
    #[serde(default)]
    pub publish_mode: PublishMode,
}

/// Endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    /// Ports
    #[serde(default)]
    pub ports: Vec<PortConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_replicated_service() {
        let json = r#"{
            "ID": "abc",
            "Version": {"Index": 7},
            "CreatedAt": "2024-03-01T10:00:00Z",
            "UpdatedAt": "2024-03-01T11:00:00Z",
            "Spec": {
                "Name": "web",
                "Labels": {"com.docker.stack.namespace": "shop"},
                "TaskTemplate": {
                    "ContainerSpec": {"Image": "nginx:1.25"},
                    "Placement": {"MaxReplicas": 2}
                },
                "Mode": {"Replicated": {"Replicas": 3}}
            },
            "Endpoint": {
                "Ports": [{"Protocol": "tcp", "TargetPort": 80, "PublishedPort": 8080, "PublishMode": "ingress"}]
            }
        }"#;

        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.id, "abc");
        assert_eq!(service.version.index, 7);
        assert_eq!(service.mode(), Some(ServiceMode::Replicated { replicas: 3 }));
        assert_eq!(service.image(), "nginx:1.25");
        assert_eq!(service.max_replicas(), 2);
        assert_eq!(service.endpoint.ports[0].published_port, 8080);
    }

    #[test]
    fn test_decode_global_service() {
        let json = r#"{"ID": "g1", "Spec": {"Name": "agent", "Mode": {"Global": {}}}}"#;

        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.mode(), Some(ServiceMode::Global));
        assert_eq!(service.image(), "");
        assert_eq!(service.max_replicas(), 0);
    }

    #[test]
    fn test_job_mode_has_no_display_mode() {
        let json = r#"{"ID": "j1", "Spec": {"Name": "migrate", "Mode": {"ReplicatedJob": {}}}}"#;

        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.mode(), None);
    }
}
