//! Command handlers
//!
//! Handlers validate their arguments and format before contacting the
//! manager, and write to the [`Cli`] streams only once all output is ready.

pub mod config;
pub mod stack;

use crate::client::SwarmApi;
use crate::config::CliConfig;
use crate::error::{Result, SwarmctlError};
use std::io::Write;
use std::sync::Arc;

/// Everything a command needs: the API client, client configuration and
/// output streams
pub struct Cli<O: Write, E: Write> {
    client: Arc<dyn SwarmApi>,
    config_file: CliConfig,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Cli<O, E> {
    pub fn new(client: Arc<dyn SwarmApi>, config_file: CliConfig, out: O, err: E) -> Self {
        Self {
            client,
            config_file,
            out,
            err,
        }
    }

    pub fn client(&self) -> Arc<dyn SwarmApi> {
        Arc::clone(&self.client)
    }

    pub fn config_file(&self) -> &CliConfig {
        &self.config_file
    }

    pub fn out(&mut self) -> &mut O {
        &mut self.out
    }

    pub fn err(&mut self) -> &mut E {
        &mut self.err
    }

    /// Give back the output streams
    pub fn into_streams(self) -> (O, E) {
        (self.out, self.err)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "argument"
    } else {
        "arguments"
    }
}

pub(crate) fn exact_args(command: &str, args: &[String], n: usize) -> Result<()> {
    if args.len() != n {
        return Err(SwarmctlError::Args(format!(
            "\"swarmctl {}\" requires exactly {} {}",
            command,
            n,
            plural(n)
        )));
    }
    Ok(())
}

pub(crate) fn no_args(command: &str, args: &[String]) -> Result<()> {
    if !args.is_empty() {
        return Err(SwarmctlError::Args(format!(
            "\"swarmctl {}\" accepts no arguments",
            command
        )));
    }
    Ok(())
}

pub(crate) fn min_args(command: &str, args: &[String], n: usize) -> Result<()> {
    if args.len() < n {
        return Err(SwarmctlError::Args(format!(
            "\"swarmctl {}\" requires at least {} {}",
            command,
            n,
            plural(n)
        )));
    }
    Ok(())
}
