// * optional config file plus the merged settings handed to `run`
use anyhow::{bail, Context};
use config_file::FromConfigFile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::args::LinklookArgs;

pub const DEFAULT_CONFIG_PATH: &str = "~/.linklook/config.toml";

/// Which name resolution backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// platform resolver (getaddrinfo): hosts file, DNS, mDNS, ...
    #[default]
    System,
    /// A-record queries straight to the nameservers in resolv.conf
    Dns,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub resolver: Option<ResolverKind>,
}

/// Everything the pipeline needs, passed explicitly into [`crate::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub file: PathBuf,
    pub resolver: ResolverKind,
    pub progress: bool,
}

impl Settings {
    // command line wins over config file
    pub fn new(args: LinklookArgs, config: Config) -> Settings {
        Settings {
            file: args.file,
            resolver: args.resolver.or(config.resolver).unwrap_or_default(),
            progress: args.progress,
        }
    }
}

/// Read the config file. An explicit path must exist; the default one may be absent.
pub fn read_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let explicit = path.is_some();
    let raw = match path {
        Some(path) => path.to_string_lossy().into_owned(),
        None => DEFAULT_CONFIG_PATH.to_string(),
    };
    let expanded = shellexpand::tilde(&raw);
    let path = Path::new(expanded.as_ref());

    if !path.exists() {
        if explicit {
            bail!("config file {} does not exist", path.display());
        }
        debug!("no config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let config = Config::from_config_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    debug!(?config, "loaded config from {}", path.display());
    Ok(config)
}
