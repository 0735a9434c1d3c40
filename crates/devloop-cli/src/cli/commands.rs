use clap::{Args, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Available devloop subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server with watch mode
    ///
    /// Builds the script bundle (and the wasm module if its artifact is
    /// missing), then serves the site and rebuilds whenever sources change.
    Dev(DevArgs),

    /// Validate configuration and toolchains
    ///
    /// Loads devloop.toml, probes the native compiler and script bundler,
    /// and reports which watch roots exist.
    Check(CheckArgs),
}

/// Options shared by every command that works on a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root directory
    ///
    /// All relative paths in the configuration resolve against it.
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to the configuration file
    ///
    /// Defaults to devloop.toml in the project root; a missing default file
    /// is fine, a missing explicit one is an error.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port to listen on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Interface to bind (defaults to loopback)
    #[arg(long, value_name = "ADDR")]
    pub host: Option<IpAddr>,

    /// Serve only: skip file watching and rebuilds
    #[arg(long)]
    pub no_watch: bool,

    /// Open the site in the default browser
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Skip probing the external toolchains
    #[arg(long)]
    pub skip_tools: bool,
}
