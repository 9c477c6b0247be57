//! swarmctl - A Docker Swarm command-line client
//!
//! swarmctl talks to a swarm manager over the Docker Engine API and
//! provides a small set of read-only commands:
//!
//! - `stack services`: services of a stack with replica and port summaries
//! - `config ls`: configs, filterable and formattable with Go-style templates
//! - `config inspect`: configs as JSON, pretty text or a custom template

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;
pub mod swarm;

#[cfg(test)]
mod testutil;

pub use error::{Result, SwarmctlError};
