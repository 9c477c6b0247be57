//! Config rows for `config ls` and documents for `config inspect`

use super::{human_duration, Context, Schema, Template, PRETTY_FORMAT_KEY};
use crate::error::Result;
use crate::swarm::Config;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

pub const DEFAULT_TABLE_FORMAT: &str = "table {{.ID}}\t{{.Name}}\t{{.CreatedAt}}\t{{.UpdatedAt}}";

pub static SCHEMA: Schema = Schema {
    fields: &[
        ("ID", "ID"),
        ("Name", "NAME"),
        ("CreatedAt", "CREATED"),
        ("UpdatedAt", "UPDATED"),
        ("Labels", "LABELS"),
    ],
    methods: &[("Label", "LABEL")],
};

/// Top-level accessors of an inspected config
pub const INSPECT_FIELDS: &[&str] = &["ID", "Version", "CreatedAt", "UpdatedAt", "Spec"];

/// One config as seen by list templates
pub struct ConfigContext<'a> {
    config: &'a Config,
    now: DateTime<Utc>,
}

impl<'a> ConfigContext<'a> {
    /// `now` anchors the relative `CreatedAt`/`UpdatedAt` columns
    pub fn new(config: &'a Config, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }

    fn ago(&self, at: DateTime<Utc>) -> String {
        format!("{} ago", human_duration(self.now - at))
    }

    fn labels(&self) -> String {
        self.config
            .spec
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Context for ConfigContext<'_> {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "ID" => self.config.id.clone(),
            "Name" => self.config.spec.name.clone(),
            "CreatedAt" => self.ago(self.config.created_at),
            "UpdatedAt" => self.ago(self.config.updated_at),
            "Labels" => self.labels(),
            _ => return None,
        };
        Some(Value::String(value))
    }

    fn method(&self, name: &str, args: &[Value]) -> Option<Value> {
        match (name, args) {
            ("Label", [Value::String(key)]) => Some(Value::String(
                self.config.spec.labels.get(key).cloned().unwrap_or_default(),
            )),
            _ => None,
        }
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

/// How `config inspect` prints its results
#[derive(Debug)]
pub enum InspectFormat {
    /// Indented JSON array of the inspected objects
    Json,
    /// Human-readable blocks
    Pretty,
    /// A template executed per object
    Template(Template),
}

impl InspectFormat {
    /// `pretty` wins over any `--format`; an empty format means JSON
    pub fn new(format: Option<&str>, pretty: bool) -> Result<Self> {
        let format = format.unwrap_or_default();
        if pretty || format == PRETTY_FORMAT_KEY {
            return Ok(Self::Pretty);
        }
        if format.is_empty() {
            return Ok(Self::Json);
        }
        let template = Template::parse(format)?;
        template.check_fields(INSPECT_FIELDS)?;
        Ok(Self::Template(template))
    }

    /// Render every config, then write the result to `out`
    pub fn write(&self, configs: &[(Config, Vec<u8>)], out: &mut dyn Write) -> Result<()> {
        let text = match self {
            Self::Json => json_array(configs)?,
            Self::Pretty => configs
                .iter()
                .map(|(config, _)| pretty(config))
                .collect::<Result<Vec<_>>>()?
                .join("\n"),
            Self::Template(template) => {
                let mut text = String::new();
                for (config, _) in configs {
                    let value = serde_json::to_value(config)?;
                    text.push_str(&template.execute(&value)?);
                    text.push('\n');
                }
                text
            }
        };
        out.write_all(text.as_bytes())?;
        Ok(())
    }
}

fn json_array(configs: &[(Config, Vec<u8>)]) -> Result<String> {
    let elements = configs
        .iter()
        .map(|(config, raw)| {
            if raw.is_empty() {
                serde_json::to_value(config)
            } else {
                serde_json::from_slice(raw)
            }
        })
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    Value::Array(elements).serialize(&mut ser)?;
    buf.push(b'\n');

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Go's default time layout: fractional seconds lose their trailing zeros
fn pretty_time(at: DateTime<Utc>) -> String {
    let nanos = format!("{:09}", at.timestamp_subsec_nanos());
    let fraction = nanos.trim_end_matches('0');
    if fraction.is_empty() {
        at.format("%Y-%m-%d %H:%M:%S +0000 utc").to_string()
    } else {
        format!("{}.{} +0000 utc", at.format("%Y-%m-%d %H:%M:%S"), fraction)
    }
}

fn pretty(config: &Config) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("ID:              {}\n", config.id));
    out.push_str(&format!("Name:            {}\n", config.spec.name));
    if !config.spec.labels.is_empty() {
        out.push_str("Labels:\n");
        for (key, value) in &config.spec.labels {
            if value.is_empty() {
                out.push_str(&format!(" - {}\n", key));
            } else {
                out.push_str(&format!(" - {}={}\n", key, value));
            }
        }
    }
    out.push_str(&format!("Created at:      {}\n", pretty_time(config.created_at)));
    out.push_str(&format!("Updated at:      {}\n", pretty_time(config.updated_at)));
    out.push_str("Data:\n");
    out.push_str(&config.get_data_string()?);
    out.push('\n');
    Ok(out)
}
