//! `clap`-derived CLI surface: configuration inspection, provider health
//! checks, host-install stanza generation, pricing inspection, database
//! inspection, and a dashboard stub (the dashboard body is out of scope;
//! its CLI contract is not).

mod commands;

pub use commands::{run, Cli};
