//! Docker Swarm API objects
//!
//! Read-only snapshots of the objects the swarm manager returns. Field
//! names follow the Docker Engine API JSON encoding.

pub mod config;
pub mod node;
pub mod service;
pub mod task;

use serde::{Deserialize, Serialize};

pub use config::{Config, ConfigSpec};
pub use node::{Node, NodeState};
pub use service::{PortConfig, Protocol, PublishMode, Service, ServiceMode, ServiceSpec};
pub use task::{Task, TaskState};

/// Object version, bumped by the manager on every update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Version {
    /// Version index
    pub index: u64,
}
