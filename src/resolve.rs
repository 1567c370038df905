// * blocking hostname -> IPv4 resolution
use anyhow::{anyhow, bail, Context};
use dns_lookup::{AddrFamily, AddrInfoHints, LookupErrorKind, SockType};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::Resolver;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

use crate::config::ResolverKind;

pub const FAILURE_MARKER: &str = "не удалось резолвить";

/// Outcome of one lookup. `Unresolved` is the only failure that does not abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Ipv4Addr),
    Unresolved,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resolution::Resolved(ip) => write!(f, "{ip}"),
            Resolution::Unresolved => f.write_str(FAILURE_MARKER),
        }
    }
}

/// One output line: `host => ip` or `host => <failure marker>`.
#[derive(Debug)]
pub struct HostReport<'a> {
    pub authority: &'a str,
    pub resolution: Resolution,
}

impl fmt::Display for HostReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} => {}", self.authority, self.resolution)
    }
}

const MAX_LABEL_LEN: usize = 63;

/// Name actually sent to the resolver: IDNA (punycode) for non-ASCII hosts,
/// unchanged otherwise. Empty or over-long labels are an error; a single
/// trailing dot is allowed.
pub fn lookup_name(host: &str) -> anyhow::Result<Cow<'_, str>> {
    let name: Cow<'_, str> = if host.is_ascii() {
        Cow::Borrowed(host)
    } else {
        Cow::Owned(
            idna::domain_to_ascii(host)
                .map_err(|err| anyhow!("cannot IDNA-encode {host:?}: {err:?}"))?,
        )
    };

    let mut labels: Vec<&str> = name.split('.').collect();
    let last = labels.pop().unwrap_or_default();
    if last.len() > MAX_LABEL_LEN
        || labels
            .iter()
            .any(|label| label.is_empty() || label.len() > MAX_LABEL_LEN)
    {
        bail!("label empty or too long in {host:?}");
    }
    Ok(name)
}

pub trait HostResolver {
    /// Look `host` up without stripping port or userinfo. `Err` means the run cannot go on.
    fn resolve(&self, host: &str) -> anyhow::Result<Resolution>;
}

/// The platform resolver, via `getaddrinfo` restricted to IPv4.
#[derive(Debug, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str) -> anyhow::Result<Resolution> {
        let hints = AddrInfoHints {
            socktype: SockType::Stream.into(),
            protocol: 0,
            address: AddrFamily::Inet.into(),
            flags: 0,
        };
        let name = lookup_name(host)?;
        let addrs = match dns_lookup::getaddrinfo(Some(name.as_ref()), None, Some(hints)) {
            Ok(addrs) => addrs,
            Err(err) => {
                return match err.kind() {
                    // errno-level failures are not "could not resolve"
                    LookupErrorKind::System | LookupErrorKind::IO => Err(io::Error::from(err))
                        .with_context(|| format!("system resolver failed for {host}")),
                    kind => {
                        debug!(host, ?kind, "lookup failed");
                        Ok(Resolution::Unresolved)
                    }
                };
            }
        };
        for addr in addrs {
            if let IpAddr::V4(ip) = addr?.sockaddr.ip() {
                return Ok(Resolution::Resolved(ip));
            }
        }
        Ok(Resolution::Unresolved)
    }
}

/// Direct A-record queries against the nameservers from the system DNS config.
pub struct DnsResolver {
    resolver: Resolver,
}

impl DnsResolver {
    pub fn new(config: ResolverConfig, options: ResolverOpts) -> anyhow::Result<DnsResolver> {
        let resolver = Resolver::new(config, options).context("creating DNS resolver")?;
        Ok(DnsResolver { resolver })
    }

    pub fn from_system_conf() -> anyhow::Result<DnsResolver> {
        let (config, options) = hickory_resolver::system_conf::read_system_conf()
            .context("reading system DNS configuration")?;
        DnsResolver::new(config, options)
    }
}

impl HostResolver for DnsResolver {
    fn resolve(&self, host: &str) -> anyhow::Result<Resolution> {
        let name = lookup_name(host)?;
        match self.resolver.ipv4_lookup(name.as_ref()) {
            Ok(lookup) => Ok(lookup
                .iter()
                .next()
                .map_or(Resolution::Unresolved, |a| Resolution::Resolved(a.0))),
            Err(err) => match err.kind() {
                // unknown names and names that are not valid DNS names
                ResolveErrorKind::NoRecordsFound { .. } | ResolveErrorKind::Proto(_) => {
                    debug!(host, %err, "lookup failed");
                    Ok(Resolution::Unresolved)
                }
                _ => Err(err).with_context(|| format!("DNS lookup failed for {host}")),
            },
        }
    }
}

pub fn resolver_for(kind: ResolverKind) -> anyhow::Result<Box<dyn HostResolver>> {
    Ok(match kind {
        ResolverKind::System => Box::new(SystemResolver),
        ResolverKind::Dns => Box::new(DnsResolver::from_system_conf()?),
    })
}
