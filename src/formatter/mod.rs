//! Output formatting for list and inspect commands
//!
//! A format is one of the keys `table`, `json` or `pretty`, a `table `
//! prefixed template, or a raw template. Templates are parsed and checked
//! against the object kind's [`Schema`] before any API call is made, and
//! every row is rendered before anything is written.

pub mod config;
pub mod service;
mod table;
pub mod template;
mod units;

pub use template::{Context, Template, TemplateError};
pub use units::human_duration;

use crate::error::Result;
use serde_json::{Map, Value};
use std::io::Write;

pub const TABLE_FORMAT_KEY: &str = "table";
pub const JSON_FORMAT_KEY: &str = "json";
pub const PRETTY_FORMAT_KEY: &str = "pretty";

/// Template used for `--quiet` listings
pub const DEFAULT_QUIET_FORMAT: &str = "{{.ID}}";

/// Accessors an object kind exposes to templates
#[derive(Debug)]
pub struct Schema {
    /// Field accessor and its table header
    pub fields: &'static [(&'static str, &'static str)],
    /// Accessors taking arguments, e.g. `Label`, and their table header
    pub methods: &'static [(&'static str, &'static str)],
}

impl Schema {
    /// Every accessor name templates may reference
    pub fn accessors(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .chain(self.methods)
            .map(|(name, _)| *name)
            .collect()
    }

    fn header(&self, name: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .chain(self.methods)
            .find(|(accessor, _)| *accessor == name)
            .map(|(_, header)| *header)
    }
}

/// A `--format` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format(String);

impl Format {
    pub fn new(format: impl Into<String>) -> Self {
        Self(format.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether output is aligned into columns under a header row
    pub fn is_table(&self) -> bool {
        self.0.starts_with(TABLE_FORMAT_KEY)
    }

    /// Template source this format renders with
    ///
    /// Strips the `table` prefix and expands the two-character sequences
    /// `\t` and `\n`, which shells pass through literally.
    pub fn template_source(&self) -> String {
        if self.0 == JSON_FORMAT_KEY {
            return "{{json .}}".to_string();
        }
        let source = match self.0.strip_prefix(TABLE_FORMAT_KEY) {
            Some(rest) if self.is_table() => rest,
            _ => self.0.as_str(),
        };
        source
            .trim_matches(' ')
            .replace("\\t", "\t")
            .replace("\\n", "\n")
    }
}

/// Pick the effective list format
///
/// A non-empty `--format` wins. Otherwise the config-file default applies
/// unless `--quiet` was given, and `table` is the last resort.
pub fn resolve_list_format(flag: Option<&str>, config_default: Option<&str>, quiet: bool) -> String {
    if let Some(flag) = flag.filter(|f| !f.is_empty()) {
        return flag.to_string();
    }
    if !quiet {
        if let Some(default) = config_default.filter(|f| !f.is_empty()) {
            return default.to_string();
        }
    }
    TABLE_FORMAT_KEY.to_string()
}

/// Expand the `table` key of a list format into the kind's default table
pub fn list_format(source: &str, quiet: bool, default_table: &str) -> Format {
    match source {
        TABLE_FORMAT_KEY if quiet => Format::new(DEFAULT_QUIET_FORMAT),
        TABLE_FORMAT_KEY => Format::new(default_table),
        other => Format::new(other),
    }
}

/// Renders rows of one object kind with a validated format
#[derive(Debug)]
pub struct Renderer {
    template: Template,
    table: bool,
    schema: &'static Schema,
}

impl Renderer {
    /// Parse `format` and check it against `schema`
    pub fn new(format: &Format, schema: &'static Schema) -> Result<Self> {
        let template = Template::parse(&format.template_source())?;
        template.check_fields(&schema.accessors())?;

        Ok(Self {
            template,
            table: format.is_table(),
            schema,
        })
    }

    /// Render every row, then write the result to `out` in one go
    pub fn render<C: Context>(&self, rows: &[C], out: &mut dyn Write) -> Result<()> {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        if self.table {
            lines.push(self.template.execute(&HeaderContext(self.schema))?);
        }
        for row in rows {
            lines.push(self.template.execute(row)?);
        }

        let text = if self.table {
            table::align(&lines)?
        } else {
            lines
                .iter()
                .map(|line| format!("{}\n", line))
                .collect::<String>()
                .into_bytes()
        };
        out.write_all(&text)?;
        Ok(())
    }
}

/// Resolves every accessor to its column header
struct HeaderContext(&'static Schema);

impl Context for HeaderContext {
    fn field(&self, name: &str) -> Option<Value> {
        self.0.header(name).map(Value::from)
    }

    fn method(&self, name: &str, _args: &[Value]) -> Option<Value> {
        self.0.header(name).map(Value::from)
    }

    fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .fields
            .iter()
            .map(|(name, header)| (name.to_string(), Value::from(*header)))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    static TEST_SCHEMA: Schema = Schema {
        fields: &[("ID", "ID"), ("Name", "NAME")],
        methods: &[("Label", "LABEL")],
    };

    fn rows() -> Vec<Value> {
        vec![
            json!({"ID": "id-a", "Name": "alpha"}),
            json!({"ID": "id-b", "Name": "beta"}),
        ]
    }

    fn render(format: &str) -> String {
        let renderer = Renderer::new(&Format::new(format), &TEST_SCHEMA).unwrap();
        let mut out = Vec::new();
        renderer.render(&rows(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_resolve_list_format() {
        assert_eq!(resolve_list_format(Some("{{.ID}}"), Some("json"), false), "{{.ID}}");
        assert_eq!(resolve_list_format(Some(""), Some("json"), false), "json");
        assert_eq!(resolve_list_format(None, Some("json"), true), "table");
        assert_eq!(resolve_list_format(None, None, false), "table");
        assert_eq!(resolve_list_format(None, Some(""), false), "table");
    }

    #[test]
    fn test_list_format() {
        let default = "table {{.ID}}\t{{.Name}}";

        assert_eq!(list_format("table", false, default).as_str(), default);
        assert_eq!(list_format("table", true, default).as_str(), "{{.ID}}");
        assert_eq!(list_format("json", true, default).as_str(), "json");
    }

    #[test]
    fn test_template_source() {
        assert_eq!(Format::new("json").template_source(), "{{json .}}");
        assert_eq!(
            Format::new("table {{.ID}}\\t{{.Name}}").template_source(),
            "{{.ID}}\t{{.Name}}"
        );
        assert_eq!(Format::new("{{.ID}}").template_source(), "{{.ID}}");
        assert!(Format::new("table {{.ID}}").is_table());
        assert!(!Format::new("{{.ID}}").is_table());
    }

    #[test]
    fn test_table_output() {
        assert_eq!(
            render("table {{.ID}}\t{{.Name}}"),
            "ID        NAME\nid-a      alpha\nid-b      beta\n"
        );
    }

    #[test]
    fn test_table_header_with_zero_rows() {
        let renderer = Renderer::new(&Format::new("table {{.Name}}"), &TEST_SCHEMA).unwrap();
        let mut out = Vec::new();
        renderer.render::<Value>(&[], &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "NAME\n");
    }

    #[test]
    fn test_raw_template_output() {
        assert_eq!(render("{{.Name}}-{{.ID}}"), "alpha-id-a\nbeta-id-b\n");
    }

    #[test]
    fn test_json_output() {
        assert_eq!(
            render("json"),
            "{\"ID\":\"id-a\",\"Name\":\"alpha\"}\n{\"ID\":\"id-b\",\"Name\":\"beta\"}\n"
        );
    }

    #[test]
    fn test_unknown_field_is_rejected_before_rendering() {
        let err = Renderer::new(&Format::new("{{.Nope}}"), &TEST_SCHEMA).unwrap_err();

        assert_eq!(
            err.to_string(),
            "template parsing error: template: :1: can't evaluate field Nope"
        );
    }

    #[test]
    fn test_render_error_writes_nothing() {
        let renderer = Renderer::new(&Format::new("{{index .ID 3}}"), &TEST_SCHEMA).unwrap();
        let mut out = Vec::new();

        assert!(renderer.render(&rows(), &mut out).is_err());
        assert!(out.is_empty());
    }
}
