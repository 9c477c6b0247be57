//! `swarmctl config ls` and `swarmctl config inspect`

use super::{min_args, no_args, Cli};
use crate::client::FilterSet;
use crate::error::Result;
use crate::formatter::config::{self, ConfigContext, InspectFormat};
use crate::formatter::{list_format, resolve_list_format, Renderer};
use chrono::Utc;
use clap::Args;
use std::io::Write;
use tracing::debug;

#[derive(Args, Debug, Clone, Default)]
pub struct ListOptions {
    #[arg(hide = true)]
    pub args: Vec<String>,

    /// Only display IDs
    #[arg(short, long)]
    pub quiet: bool,

    /// Format output using a custom template ('table', 'table TEMPLATE', 'json' or TEMPLATE)
    #[arg(long)]
    pub format: Option<String>,

    /// Filter output based on conditions provided (name=value)
    #[arg(short, long, value_name = "FILTER")]
    pub filter: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InspectOptions {
    /// Config IDs or names
    #[arg(value_name = "CONFIG")]
    pub args: Vec<String>,

    /// Format output using a custom template ('json', 'pretty' or TEMPLATE)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Print the information in a human friendly format
    #[arg(long)]
    pub pretty: bool,
}

/// List configs
pub async fn run_list<O: Write, E: Write>(cli: &mut Cli<O, E>, opts: &ListOptions) -> Result<()> {
    no_args("config ls", &opts.args)?;
    let filters = FilterSet::parse(&opts.filter)?;

    let source = resolve_list_format(
        opts.format.as_deref(),
        cli.config_file().config_format.as_deref(),
        opts.quiet,
    );
    let format = list_format(&source, opts.quiet, config::DEFAULT_TABLE_FORMAT);
    let renderer = Renderer::new(&format, &config::SCHEMA)?;

    let mut configs = cli.client().list_configs(&filters).await?;
    configs.sort_by(|a, b| a.spec.name.cmp(&b.spec.name));
    debug!("listing {} configs", configs.len());

    let now = Utc::now();
    let rows: Vec<ConfigContext> = configs.iter().map(|c| ConfigContext::new(c, now)).collect();
    renderer.render(&rows, cli.out())
}

/// Inspect one or more configs
///
/// Every config is fetched before anything is printed; the first failed
/// lookup aborts the command with no output.
pub async fn run_inspect<O: Write, E: Write>(
    cli: &mut Cli<O, E>,
    opts: &InspectOptions,
) -> Result<()> {
    min_args("config inspect", &opts.args, 1)?;
    let format = InspectFormat::new(opts.format.as_deref(), opts.pretty)?;

    let client = cli.client();
    let mut configs = Vec::with_capacity(opts.args.len());
    for id in &opts.args {
        debug!("inspecting config {}", id);
        configs.push(client.inspect_config(id).await?);
    }

    format.write(&configs, cli.out())
}
