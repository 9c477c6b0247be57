//! Builders and a scriptable fake manager for unit tests

use crate::client::{FilterSet, SwarmApi};
use crate::error::Result;
use crate::swarm::service::{ContainerSpec, GlobalService, ReplicatedService, ServiceModeSpec};
use crate::swarm::{Config, Node, NodeState, Service, Task, TaskState};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Mutex;

type ListFn<T> = Box<dyn Fn(&FilterSet) -> Result<Vec<T>> + Send + Sync>;
type InspectFn = Box<dyn Fn(&str) -> Result<(Config, Vec<u8>)> + Send + Sync>;

/// [`SwarmApi`] answering from closures and recording every call
///
/// A call without a configured closure returns an empty list, or a
/// not-found error for inspect.
#[derive(Default)]
pub struct FakeClient {
    service_list: Option<ListFn<Service>>,
    node_list: Option<ListFn<Node>>,
    task_list: Option<ListFn<Task>>,
    config_list: Option<ListFn<Config>>,
    config_inspect: Option<InspectFn>,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_list(
        mut self,
        f: impl Fn(&FilterSet) -> Result<Vec<Service>> + Send + Sync + 'static,
    ) -> Self {
        self.service_list = Some(Box::new(f));
        self
    }

    pub fn with_node_list(
        mut self,
        f: impl Fn(&FilterSet) -> Result<Vec<Node>> + Send + Sync + 'static,
    ) -> Self {
        self.node_list = Some(Box::new(f));
        self
    }

    pub fn with_task_list(
        mut self,
        f: impl Fn(&FilterSet) -> Result<Vec<Task>> + Send + Sync + 'static,
    ) -> Self {
        self.task_list = Some(Box::new(f));
        self
    }

    pub fn with_config_list(
        mut self,
        f: impl Fn(&FilterSet) -> Result<Vec<Config>> + Send + Sync + 'static,
    ) -> Self {
        self.config_list = Some(Box::new(f));
        self
    }

    pub fn with_config_inspect(
        mut self,
        f: impl Fn(&str) -> Result<(Config, Vec<u8>)> + Send + Sync + 'static,
    ) -> Self {
        self.config_inspect = Some(Box::new(f));
        self
    }

    /// Names of the API calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

fn list<T>(f: &Option<ListFn<T>>, filters: &FilterSet) -> Result<Vec<T>> {
    match f {
        Some(f) => f(filters),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl SwarmApi for FakeClient {
    async fn list_services(&self, filters: &FilterSet) -> Result<Vec<Service>> {
        self.record("list_services");
        list(&self.service_list, filters)
    }

    async fn list_nodes(&self, filters: &FilterSet) -> Result<Vec<Node>> {
        self.record("list_nodes");
        list(&self.node_list, filters)
    }

    async fn list_tasks(&self, filters: &FilterSet) -> Result<Vec<Task>> {
        self.record("list_tasks");
        list(&self.task_list, filters)
    }

    async fn list_configs(&self, filters: &FilterSet) -> Result<Vec<Config>> {
        self.record("list_configs");
        list(&self.config_list, filters)
    }

    async fn inspect_config(&self, id: &str) -> Result<(Config, Vec<u8>)> {
        self.record(&format!("inspect_config {}", id));
        match &self.config_inspect {
            Some(f) => f(id),
            None => Err(crate::SwarmctlError::Daemon(format!(
                "config {} not found",
                id
            ))),
        }
    }
}

fn service(id: &str, name: &str, mode: ServiceModeSpec) -> Service {
    let mut service = Service {
        id: id.to_string(),
        ..Default::default()
    };
    service.spec.name = name.to_string();
    service.spec.mode = mode;
    service.spec.task_template.container_spec = Some(ContainerSpec {
        image: "busybox:latest".to_string(),
    });
    service
}

pub fn replicated_service(id: &str, name: &str, replicas: u64) -> Service {
    service(
        id,
        name,
        ServiceModeSpec {
            replicated: Some(ReplicatedService {
                replicas: Some(replicas),
            }),
            global: None,
        },
    )
}

pub fn global_service(id: &str, name: &str) -> Service {
    service(
        id,
        name,
        ServiceModeSpec {
            replicated: None,
            global: Some(GlobalService {}),
        },
    )
}

pub fn node(id: &str, state: NodeState) -> Node {
    let mut node = Node {
        id: id.to_string(),
        ..Default::default()
    };
    node.status.state = state;
    node
}

pub fn task(id: &str, service_id: &str, node_id: &str, state: TaskState, desired: TaskState) -> Task {
    let mut task = Task {
        id: id.to_string(),
        service_id: service_id.to_string(),
        node_id: node_id.to_string(),
        desired_state: desired,
        ..Default::default()
    };
    task.status.state = state;
    task
}

/// Config created at 2024-06-01 08:00 UTC and updated an hour later
pub fn config(id: &str, name: &str) -> Config {
    let mut config = Config {
        id: id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ..Default::default()
    };
    config.spec.name = name.to_string();
    config
}
