use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Serve job lifecycle state and live transitions over gRPC
#[derive(Debug, Parser)]
#[clap(about, version)]
pub struct Args {
    /// Path to a TOML configuration file
    #[clap(short, long, env = "JOBMON_CONFIG")]
    pub config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration file
    #[clap(short, long)]
    pub listen: Option<SocketAddr>,
    /// Human-friendly trace-level logging instead of JSON lines
    #[clap(short, long)]
    pub debug: bool,
}
