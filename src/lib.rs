use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

pub mod args;
pub mod authority;
pub mod config;
pub mod links;
pub mod logging;
pub mod resolve;

pub use config::Settings;

use crate::authority::collect_authorities;
use crate::links::extract_links;
use crate::resolve::{resolver_for, HostReport, HostResolver};

/// Read the whole document as UTF-8 text, folding `\r\n` and lone `\r` into `\n`.
pub fn read_document(path: &Path) -> anyhow::Result<String> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if text.contains('\r') {
        return Ok(text.replace("\r\n", "\n").replace('\r', "\n"));
    }
    Ok(text)
}

/// Unique authorities referenced by `href`/`src` attributes in `document`.
///
/// Fails on a link whose bracketed host is not an IP literal.
pub fn document_authorities(document: &str) -> anyhow::Result<BTreeSet<String>> {
    let links = extract_links(document);
    debug!(n_links = links.len(), "extracted links");
    collect_authorities(links)
}

/// Resolve each authority in ascending order and write one line per host.
///
/// Lines are written as soon as they are known, so a fatal lookup error
/// leaves the earlier lines in `out`.
pub fn report<W: Write>(
    authorities: &BTreeSet<String>,
    resolver: &dyn HostResolver,
    progress: &ProgressBar,
    out: &mut W,
) -> anyhow::Result<()> {
    for authority in progress.wrap_iter(authorities.iter()) {
        progress.set_message(authority.clone());
        let resolution = resolver
            .resolve(authority)
            .with_context(|| format!("resolving {authority}"))?;
        debug!(authority = authority.as_str(), %resolution, "resolved");
        let line = HostReport {
            authority,
            resolution,
        };
        progress.suspend(|| writeln!(out, "{line}"))?;
    }
    out.flush()?;
    Ok(())
}

fn progress_bar_setup(settings: &Settings, n_items: usize) -> ProgressBar {
    if !settings.progress {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(n_items as u64);
    let sty = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");
    pb.set_style(sty);
    pb
}

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    // * input stage
    let document = read_document(&settings.file)?;
    let authorities = document_authorities(&document)
        .with_context(|| format!("parsing links in {}", settings.file.display()))?;
    if authorities.is_empty() {
        return Ok(());
    }

    // * resolution and output stage
    let resolver = resolver_for(settings.resolver)?;
    let pb = progress_bar_setup(settings, authorities.len());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = report(&authorities, resolver.as_ref(), &pb, &mut out);
    pb.finish_and_clear();
    result
}
