//! Next-page discovery for paginated GitHub collections.
//!
//! GitHub reports pagination through the `Link` response header. The walker
//! only ever moves forward, so the single piece of state it needs from a
//! response is the number of the next page, if one exists.

use url::Url;

/// Extracts the next page number from a `Link` header value.
///
/// Returns `None` when the header is absent, carries no `rel="next"` entry,
/// or the next URL lacks a numeric `page` query parameter. An absent next
/// page terminates the walk.
///
/// # Example
///
/// ```
/// use tallyman::github::pagination::next_page;
///
/// let link = r#"<https://api.github.com/orgs/acme/repos?page=3>; rel="next""#;
/// assert_eq!(next_page(Some(link)), Some(3));
/// assert_eq!(next_page(None), None);
/// ```
#[must_use]
pub fn next_page(link_header: Option<&str>) -> Option<u32> {
    let header = link_header?;

    header
        .split(',')
        .find_map(|entry| next_target(entry).and_then(page_parameter))
}

/// Returns the URL portion of a `Link` entry when its relation is `next`.
fn next_target(entry: &str) -> Option<&str> {
    let mut segments = entry.split(';');
    let target = segments.next()?.trim();

    let is_next = segments.any(|segment| segment.trim() == r#"rel="next""#);
    if !is_next {
        return None;
    }

    target
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
}

fn page_parameter(target: &str) -> Option<u32> {
    let url = Url::parse(target).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "page")
        .and_then(|(_, value)| value.parse().ok())
}
