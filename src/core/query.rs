use regex::Regex;
use std::sync::LazyLock;
use super::policy::SearchPolicy;

/// `<code>` or `<code>,<radius>` / `<code>.<radius>`
static POSTAL_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4,6})(?:\s*[,.]\s*(.*))?$").expect("postal input pattern is valid")
});

/// A postal-code search with its effective radius
#[derive(Debug, Clone, PartialEq)]
pub struct PostalQuery {
    pub code: String,
    pub radius_miles: f64,
    /// The caller supplied a usable radius
    pub radius_explicit: bool,
}

/// Classified directory search input
#[derive(Debug, Clone, PartialEq)]
pub enum SearchInput {
    Empty,
    Postal(PostalQuery),
    Text(String),
}

/// Parse a radius leniently; anything non-numeric is absent
pub fn parse_radius(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Classify raw search input and settle the radius
///
/// `radius_param` is a separately supplied radius (e.g. a query parameter) and
/// wins over one written inline after the code. Radii are clamped to the
/// policy bounds; missing or malformed radii fall back to the policy default
/// (or a per-code override).
pub fn parse_search_input(
    raw: &str,
    radius_param: Option<&str>,
    policy: &SearchPolicy,
) -> SearchInput {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return SearchInput::Empty;
    }

    let Some(caps) = POSTAL_INPUT.captures(trimmed) else {
        return SearchInput::Text(trimmed.to_string());
    };

    let code = caps[1].to_string();
    let inline_radius = caps.get(2).and_then(|m| parse_radius(m.as_str()));
    let explicit = radius_param.and_then(parse_radius).or(inline_radius);

    let (radius_miles, radius_explicit) = match explicit {
        Some(r) => (policy.clamp_radius(r), true),
        None => (policy.implicit_radius(&code), false),
    };

    SearchInput::Postal(PostalQuery {
        code,
        radius_miles,
        radius_explicit,
    })
}
