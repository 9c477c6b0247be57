//! Swarm node objects

use super::Version;
use serde::{Deserialize, Serialize};

/// Node state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Node is unknown
    #[default]
    Unknown,
    /// Node is down
    Down,
    /// Node is ready
    Ready,
    /// Node is disconnected
    Disconnected,
}

/// Swarm node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    /// Node ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Object version
    #[serde(default)]
    pub version: Version,
    /// Node status
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    /// Whether tasks on this node can be counted as running
    pub fn is_up(&self) -> bool {
        self.status.state != NodeState::Down
    }
}

/// Node status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStatus {
    /// State
    #[serde(default)]
    pub state: NodeState,
    /// Message
    #[serde(default)]
    pub message: String,
    /// Address
    #[serde(default)]
    pub addr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_node() {
        let json = r#"{
            "ID": "node-1",
            "Description": {"Hostname": "worker-a"},
            "Status": {"State": "ready", "Addr": "10.0.0.4"}
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, "node-1");
        assert_eq!(node.status.state, NodeState::Ready);
        assert!(node.is_up());
    }

    #[test]
    fn test_down_node() {
        let node = Node {
            id: "node-2".to_string(),
            status: NodeStatus {
                state: NodeState::Down,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(!node.is_up());
    }
}
