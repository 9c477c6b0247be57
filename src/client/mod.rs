//! Swarm manager API client
//!
//! Commands talk to the manager only through [`SwarmApi`], so tests can
//! substitute a fake and the HTTP transport stays in one place.

mod filters;
mod http;

pub use filters::FilterSet;
pub use http::{HttpClient, API_VERSION, DEFAULT_HOST};

use crate::error::Result;
use crate::swarm::{Config, Node, Service, Task};
use async_trait::async_trait;

/// Read-only view of the swarm manager API
#[async_trait]
pub trait SwarmApi: Send + Sync {
    /// List services matching `filters`
    async fn list_services(&self, filters: &FilterSet) -> Result<Vec<Service>>;

    /// List nodes matching `filters`
    async fn list_nodes(&self, filters: &FilterSet) -> Result<Vec<Node>>;

    /// List tasks matching `filters`
    async fn list_tasks(&self, filters: &FilterSet) -> Result<Vec<Task>>;

    /// List configs matching `filters`
    async fn list_configs(&self, filters: &FilterSet) -> Result<Vec<Config>>;

    /// Inspect a config by ID or name, returning the decoded object and the
    /// response body it was decoded from
    async fn inspect_config(&self, id: &str) -> Result<(Config, Vec<u8>)>;
}
