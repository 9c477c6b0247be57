//! Swarm task objects

use super::Version;
use serde::{Deserialize, Serialize};

/// Task state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task is new
    #[default]
    New,
    /// Task is allocated
    Allocated,
    /// Task is pending
    Pending,
    /// Task is assigned
    Assigned,
    /// Task is accepted
    Accepted,
    /// Task is preparing
    Preparing,
    /// Task is ready
    Ready,
    /// Task is starting
    Starting,
    /// Task is running
    Running,
    /// Task completed
    Complete,
    /// Task shutdown
    Shutdown,
    /// Task failed
    Failed,
    /// Task rejected
    Rejected,
    /// Task removed
    Remove,
    /// Task is orphaned
    Orphaned,
}

/// Swarm task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /// Task ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Object version
    #[serde(default)]
    pub version: Version,
    /// Service ID
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,
    /// Node ID
    #[serde(rename = "NodeID", default)]
    pub node_id: String,
    /// Slot (for replicated services)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    /// Task status
    #[serde(default)]
    pub status: TaskStatus,
    /// Desired state
    #[serde(default)]
    pub desired_state: TaskState,
}

impl Task {
    /// Check if task is running
    pub fn is_running(&self) -> bool {
        self.status.state == TaskState::Running
    }

    /// Check if the orchestrator still wants this task around
    pub fn is_wanted(&self) -> bool {
        self.desired_state != TaskState::Shutdown
    }
}

/// Task status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStatus {
    /// State
    #[serde(default)]
    pub state: TaskState,
    /// Message
    #[serde(default)]
    pub message: String,
    /// Error
    #[serde(rename = "Err", default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}
