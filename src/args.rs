use clap::Parser;
use std::path::PathBuf;

use crate::config::ResolverKind;

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Extract unique hosts from HTML links and resolve them to IPv4 addresses"
)]
pub struct LinklookArgs {
    /// path to HTML file
    #[clap(long, short)]
    pub file: PathBuf,
    /// resolver backend (overrides config file)
    #[clap(long, short, value_enum)]
    pub resolver: Option<ResolverKind>,
    /// path to config file [default: ~/.linklook/config.toml]
    #[clap(long, short)]
    pub config: Option<PathBuf>,
    /// show a progress bar on stderr while resolving
    #[clap(long, short, action)]
    pub progress: bool,
}
