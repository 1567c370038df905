// * derive the authority (netloc) of a link reference
//
// Authorities are kept verbatim: no case folding, no default ports, no
// userinfo stripping. `a.com`, `A.com` and `a.com:80` are all distinct.
use anyhow::bail;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::debug;

const DROPPED_CHARS: &[char] = &['\t', '\r', '\n'];
const AUTHORITY_END: &[char] = &['/', '?', '#'];

fn is_scheme_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')
}

// drop `scheme:` if the text before the first colon looks like one
fn strip_scheme(reference: &str) -> &str {
    match reference.find(':') {
        Some(i)
            if i > 0
                && reference.as_bytes()[0].is_ascii_alphabetic()
                && reference.as_bytes()[..i].iter().all(|&b| is_scheme_byte(b)) =>
        {
            &reference[i + 1..]
        }
        _ => reference,
    }
}

// `[...]` must hold an IP literal (optionally with a zone) or an `vX.` future form
fn is_valid_bracketed_host(host: &str) -> bool {
    if let Some(future) = host.strip_prefix('v') {
        return match future.split_once('.') {
            Some((version, rest)) => {
                !version.is_empty()
                    && version.bytes().all(|b| b.is_ascii_hexdigit())
                    && !rest.is_empty()
            }
            None => false,
        };
    }
    let address = host.split_once('%').map_or(host, |(address, _zone)| address);
    address.parse::<IpAddr>().is_ok()
}

/// Authority component of `reference`, or `None` when it has no `//authority` part.
///
/// A malformed bracketed host (`[::1` or `[bogus]`) is an error.
pub fn authority_of(reference: &str) -> anyhow::Result<Option<String>> {
    let reference = reference.trim_start_matches(|c: char| c <= ' ');
    let reference: Cow<'_, str> = if reference.contains(DROPPED_CHARS) {
        Cow::Owned(reference.replace(DROPPED_CHARS, ""))
    } else {
        Cow::Borrowed(reference)
    };

    let Some(after_slashes) = strip_scheme(&reference).strip_prefix("//") else {
        return Ok(None);
    };
    let end = after_slashes
        .find(AUTHORITY_END)
        .unwrap_or(after_slashes.len());
    let authority = &after_slashes[..end];

    if authority.is_empty() {
        return Ok(None);
    }
    match (authority.find('['), authority.find(']')) {
        (None, None) => {}
        (Some(open), Some(_)) => {
            let inner = &authority[open + 1..];
            let host = inner.split_once(']').map_or(inner, |(host, _)| host);
            if !is_valid_bracketed_host(host) {
                bail!("invalid bracketed host {host:?} in link {reference:?}");
            }
        }
        _ => bail!("invalid IPv6 URL {reference:?}: unbalanced brackets"),
    }

    Ok(Some(authority.to_string()))
}

/// Unique, non-empty authorities of `links`, ordered ascending.
pub fn collect_authorities<'a, I>(links: I) -> anyhow::Result<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut authorities = BTreeSet::new();
    for link in links {
        if let Some(authority) = authority_of(link)? {
            authorities.insert(authority);
        }
    }
    debug!(n_authorities = authorities.len(), "collected authorities");
    Ok(authorities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls() {
        assert_eq!(authority_of("http://example.com/a").unwrap(), Some("example.com".into()));
        assert_eq!(authority_of("https://example.com").unwrap(), Some("example.com".into()));
        assert_eq!(authority_of("ftp://files.example.org/pub/").unwrap(), Some("files.example.org".into()));
    }

    #[test]
    fn scheme_relative_url() {
        assert_eq!(authority_of("//cdn.example.net/lib.js").unwrap(), Some("cdn.example.net".into()));
    }

    #[test]
    fn relative_and_anchor_links_have_no_authority() {
        assert_eq!(authority_of("/foo").unwrap(), None);
        assert_eq!(authority_of("page.html").unwrap(), None);
        assert_eq!(authority_of("#top").unwrap(), None);
        assert_eq!(authority_of("?q=1").unwrap(), None);
        assert_eq!(authority_of("").unwrap(), None);
    }

    #[test]
    fn schemes_without_slashes_have_no_authority() {
        assert_eq!(authority_of("mailto:someone@example.com").unwrap(), None);
        assert_eq!(authority_of("javascript:void(0)").unwrap(), None);
        assert_eq!(authority_of("data:image/png;base64,AAAA").unwrap(), None);
    }

    #[test]
    fn empty_authority_is_dropped() {
        assert_eq!(authority_of("file:///etc/hosts").unwrap(), None);
        assert_eq!(authority_of("http:///path").unwrap(), None);
    }

    #[test]
    fn authority_stops_at_path_query_or_fragment() {
        assert_eq!(authority_of("http://a.com?x=1").unwrap(), Some("a.com".into()));
        assert_eq!(authority_of("http://a.com#frag").unwrap(), Some("a.com".into()));
        assert_eq!(authority_of("http://a.com/p?q#f").unwrap(), Some("a.com".into()));
    }

    #[test]
    fn port_and_userinfo_are_kept_verbatim() {
        assert_eq!(authority_of("http://example.com:8080/x").unwrap(), Some("example.com:8080".into()));
        assert_eq!(authority_of("ftp://user:pw@example.com/").unwrap(), Some("user:pw@example.com".into()));
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(authority_of("HTTP://Example.COM/").unwrap(), Some("Example.COM".into()));
    }

    #[test]
    fn bracketed_ip_literals() {
        assert_eq!(authority_of("http://[::1]:8080/").unwrap(), Some("[::1]:8080".into()));
        assert_eq!(authority_of("http://[fe80::1%eth0]/").unwrap(), Some("[fe80::1%eth0]".into()));
        assert_eq!(authority_of("http://[10.0.0.1]/").unwrap(), Some("[10.0.0.1]".into()));
        assert_eq!(authority_of("http://[v1.fe]/").unwrap(), Some("[v1.fe]".into()));
    }

    #[test]
    fn unbalanced_brackets_are_an_error() {
        assert!(authority_of("http://[::1/").is_err());
        assert!(authority_of("http://::1]/").is_err());
    }

    #[test]
    fn bracketed_non_ip_host_is_an_error() {
        let err = authority_of("http://[bogus]/").unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert!(authority_of("http://[v.x]/").is_err());
    }

    #[test]
    fn collect_fails_on_malformed_bracketed_host() {
        let links = vec!["http://a.com/", "http://[::1/x", "http://b.com/"];
        assert!(collect_authorities(links).is_err());
    }

    #[test]
    fn leading_blanks_and_embedded_tabs_are_ignored() {
        assert_eq!(authority_of("  http://a.com/").unwrap(), Some("a.com".into()));
        assert_eq!(authority_of("http://a.\tcom/").unwrap(), Some("a.com".into()));
    }

    #[test]
    fn colon_after_non_scheme_text_is_not_a_scheme() {
        // `1http` cannot start a scheme, so `//` is never reached
        assert_eq!(authority_of("1http://a.com/").unwrap(), None);
        assert_eq!(authority_of("we ird://a.com/").unwrap(), None);
    }

    #[test]
    fn collect_deduplicates_without_folding_case() {
        let links = vec![
            "http://example.com/a",
            "https://example.com/b.png",
            "/relative",
            "http://Example.com/",
            "#top",
        ];
        let authorities: Vec<_> = collect_authorities(links).unwrap().into_iter().collect();
        assert_eq!(authorities, vec!["Example.com", "example.com"]);
    }

    #[test]
    fn collect_on_nothing() {
        assert!(collect_authorities(Vec::<&str>::new()).unwrap().is_empty());
    }
}
