// * linklook binary: parse args, load config, run the pipeline
use clap::Parser;
use console::style;
use std::process;

use linklook::args::LinklookArgs;
use linklook::config::{self, Settings};
use linklook::logging;

fn try_main(args: LinklookArgs) -> anyhow::Result<()> {
    logging::init_logging()?;
    let config = config::read_config(args.config.as_deref())?;
    let settings = Settings::new(args, config);
    linklook::run(&settings)
}

fn main() {
    // usage errors exit here, before any file is touched
    let args = LinklookArgs::parse();
    if let Err(err) = try_main(args) {
        eprintln!("{}: {:#}", style("error").bold().red().for_stderr(), err);
        process::exit(1);
    }
}
