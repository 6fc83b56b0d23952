//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rasteer")]
#[command(version, about = "IPv6 gateway steering via Router Advertisements", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/rasteer/rasteer.toml")]
    pub config: PathBuf,

    /// Override the configured network interface
    #[arg(short = 'I', long, global = true)]
    pub interface: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available network interfaces
    Interfaces,

    /// Run one broadcast cycle and exit
    Once,
}
