//! Service rows for `stack services`

use super::{Context, Schema};
use crate::swarm::{Node, PortConfig, Protocol, PublishMode, Service, ServiceMode, Task};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DEFAULT_TABLE_FORMAT: &str =
    "table {{.ID}}\t{{.Name}}\t{{.Mode}}\t{{.Replicas}}\t{{.Image}}\t{{.Ports}}";

pub static SCHEMA: Schema = Schema {
    fields: &[
        ("ID", "ID"),
        ("Name", "NAME"),
        ("Mode", "MODE"),
        ("Replicas", "REPLICAS"),
        ("Image", "IMAGE"),
        ("Ports", "PORTS"),
    ],
    methods: &[],
};

/// Mode and replica summary of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInfo {
    pub mode: String,
    pub replicas: String,
}

/// Summarize each service's mode and running tasks, keyed by service ID
///
/// A task counts as running when its state is `running` and it sits on a
/// known node that is not down. Services in modes other than replicated or
/// global get no entry.
pub fn services_status(
    services: &[Service],
    nodes: &[Node],
    tasks: &[Task],
) -> HashMap<String, ListInfo> {
    let active_nodes: HashSet<&str> = nodes
        .iter()
        .filter(|node| node.is_up())
        .map(|node| node.id.as_str())
        .collect();

    let mut running: HashMap<&str, u64> = HashMap::new();
    let mut wanted: HashMap<&str, u64> = HashMap::new();
    for task in tasks {
        if task.is_running() && active_nodes.contains(task.node_id.as_str()) {
            *running.entry(task.service_id.as_str()).or_default() += 1;
        }
        if task.is_wanted() {
            *wanted.entry(task.service_id.as_str()).or_default() += 1;
        }
    }

    let mut info = HashMap::new();
    for service in services {
        let Some(mode) = service.mode() else {
            continue;
        };
        let running = running.get(service.id.as_str()).copied().unwrap_or(0);
        let replicas = match mode {
            ServiceMode::Replicated { replicas } => match service.max_replicas() {
                0 => format!("{}/{}", running, replicas),
                max => format!("{}/{} (max {} per node)", running, replicas, max),
            },
            ServiceMode::Global => {
                let wanted = wanted.get(service.id.as_str()).copied().unwrap_or(0);
                format!("{}/{}", running, wanted)
            }
        };
        info.insert(
            service.id.clone(),
            ListInfo {
                mode: mode.to_string(),
                replicas,
            },
        );
    }
    info
}

/// One service as seen by list templates
pub struct ServiceContext<'a> {
    service: &'a Service,
    info: Option<&'a ListInfo>,
}

impl<'a> ServiceContext<'a> {
    pub fn new(service: &'a Service, info: Option<&'a ListInfo>) -> Self {
        Self { service, info }
    }

    fn mode(&self) -> String {
        self.info.map(|i| i.mode.clone()).unwrap_or_default()
    }

    fn replicas(&self) -> String {
        self.info.map(|i| i.replicas.clone()).unwrap_or_default()
    }
}

impl Context for ServiceContext<'_> {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "ID" => self.service.id.clone(),
            "Name" => self.service.spec.name.clone(),
            "Mode" => self.mode(),
            "Replicas" => self.replicas(),
            "Image" => display_image(self.service.image()),
            "Ports" => display_ports(&self.service.endpoint.ports),
            _ => return None,
        };
        Some(Value::String(value))
    }

    fn to_value(&self) -> Value {
        let map: Map<String, Value> = SCHEMA
            .fields
            .iter()
            .filter_map(|(name, _)| self.field(name).map(|v| (name.to_string(), v)))
            .collect();
        Value::Object(map)
    }
}

/// Image reference without its digest, in familiar form
fn display_image(image: &str) -> String {
    let named = image.split_once('@').map_or(image, |(named, _)| named);
    named
        .strip_prefix("docker.io/library/")
        .or_else(|| named.strip_prefix("docker.io/"))
        .unwrap_or(named)
        .to_string()
}

/// A run of published ports mapped onto a run of target ports
struct PortRange {
    protocol: Protocol,
    published_start: u32,
    published_end: u32,
    target_start: u32,
    target_end: u32,
}

impl PortRange {
    fn new(port: &PortConfig) -> Self {
        Self {
            protocol: port.protocol,
            published_start: port.published_port,
            published_end: port.published_port,
            target_start: port.target_port,
            target_end: port.target_port,
        }
    }

    fn extends_with(&self, port: &PortConfig) -> bool {
        let is_range = self.target_end != self.target_start;
        let overlaps = port.target_port <= self.target_end;
        port.protocol == self.protocol
            && port.published_port.wrapping_sub(self.published_end) <= 1
            && port.target_port.wrapping_sub(self.target_end) <= 1
            && !(is_range && overlaps)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.published_start == self.published_end {
            write!(
                f,
                "*:{}->{}/{}",
                self.published_start, self.target_start, self.protocol
            )
        } else {
            write!(
                f,
                "*:{}-{}->{}-{}/{}",
                self.published_start,
                self.published_end,
                self.target_start,
                self.target_end,
                self.protocol
            )
        }
    }
}

/// Ingress-published ports, with consecutive ports folded into ranges
fn display_ports(ports: &[PortConfig]) -> String {
    let mut ingress: Vec<&PortConfig> = ports
        .iter()
        .filter(|p| p.publish_mode == PublishMode::Ingress)
        .collect();
    ingress.sort_by(|a, b| {
        a.protocol
            .to_string()
            .cmp(&b.protocol.to_string())
            .then(a.published_port.cmp(&b.published_port))
    });

    let mut ranges: Vec<PortRange> = Vec::new();
    for port in ingress {
        if let Some(range) = ranges.last_mut().filter(|r| r.extends_with(port)) {
            range.published_end = port.published_port;
            range.target_end = port.target_port;
            continue;
        }
        ranges.push(PortRange::new(port));
    }

    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
