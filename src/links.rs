// * pull href/src attribute values out of raw text
use regex::Regex;
use std::sync::OnceLock;

// no tag awareness: any `href=`/`src=` followed by a quoted value counts,
// and the value ends at the first quote of either kind
const LINK_PATTERN: &str = r#"(?i)(?:href|src)=["'](.*?)["']"#;

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINK_PATTERN).expect("link pattern should compile"))
}

/// Return the quoted values of every `href`/`src` attribute, in document order.
pub fn extract_links(document: &str) -> Vec<&str> {
    link_re()
        .captures_iter(document)
        .filter_map(|caps| caps.get(1))
        .map(|value| value.as_str())
        .collect()
}
