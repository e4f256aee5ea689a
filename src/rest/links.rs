//! Pagination links parsed from the `Link` response header.
//!
//! GitLab paginated endpoints answer with a header of the form:
//!
//! ```text
//! Link: <https://gitlab.example.com/api/v4/projects?page=2&per_page=20>; rel="next",
//!       <https://gitlab.example.com/api/v4/projects?page=1&per_page=20>; rel="first",
//!       <https://gitlab.example.com/api/v4/projects?page=9&per_page=20>; rel="last"
//! ```
//!
//! Only the `first`, `prev`, `next` and `last` relations are kept.

use std::collections::HashMap;

use serde::Serialize;

/// Relations retained from the header.
const RELATIONS: [&str; 4] = ["first", "prev", "next", "last"];

/// The four page-navigation URLs of a paginated response.
///
/// Built once from a header value and never modified afterwards.
///
/// # Example
///
/// ```rust
/// use gitlab_api::rest::PageLinks;
///
/// let links = PageLinks::parse(Some(r#"<https://x/p?page=1>; rel="first", <https://x/p?page=4>; rel="last""#));
/// assert_eq!(links.first.as_deref(), Some("https://x/p?page=1"));
/// assert_eq!(links.last.as_deref(), Some("https://x/p?page=4"));
/// assert!(links.prev.is_none());
/// assert!(links.next.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// URL of the first page.
    pub first: Option<String>,
    /// URL of the previous page.
    pub prev: Option<String>,
    /// URL of the next page.
    pub next: Option<String>,
    /// URL of the last page.
    pub last: Option<String>,
}

impl PageLinks {
    /// Parses a `Link` header value.
    ///
    /// An absent header, or one without any known relation, yields empty
    /// links. Unknown relations are ignored and malformed entries skipped.
    #[must_use]
    pub fn parse(header: Option<&str>) -> Self {
        let mut links = Self::default();
        let Some(header) = header else {
            return links;
        };
        if !RELATIONS.iter().any(|rel| header.contains(rel)) {
            return links;
        }

        for entry in split_entries(header) {
            let Some((url, rels)) = parse_entry(entry) else {
                tracing::debug!(entry = entry.trim(), "Skipping malformed Link header entry");
                continue;
            };
            for rel in rels.split_ascii_whitespace() {
                links.set(rel, url);
            }
        }

        links
    }

    /// Parses the `link` entry of a lower-cased header map.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Self {
        let header = headers
            .get("link")
            .map(|values| values.join(", "))
            .filter(|value| !value.is_empty());
        Self::parse(header.as_deref())
    }

    /// Returns `true` if no relation is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first.is_none() && self.prev.is_none() && self.next.is_none() && self.last.is_none()
    }

    fn set(&mut self, rel: &str, url: &str) {
        let slot = match rel {
            "first" => &mut self.first,
            "prev" => &mut self.prev,
            "next" => &mut self.next,
            "last" => &mut self.last,
            _ => return,
        };
        *slot = Some(url.to_string());
    }
}

/// Splits a header at commas that start a new `<...>` entry.
///
/// Commas inside URLs are left alone.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    for (i, _) in header.match_indices(',') {
        if header[i + 1..].trim_start().starts_with('<') {
            entries.push(&header[start..i]);
            start = i + 1;
        }
    }
    entries.push(&header[start..]);
    entries
}

/// Parses `<URL>; rel="NAME"` into its URL and relation list.
///
/// The URL runs up to the first `>`, so it may itself contain `;`.
fn parse_entry(entry: &str) -> Option<(&str, &str)> {
    let (url, params) = entry.trim().strip_prefix('<')?.split_once('>')?;
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let rel = params
        .split(';')
        .find_map(|param| param.trim().strip_prefix("rel="))?;
    let rel = rel.trim().strip_prefix('"')?.strip_suffix('"')?;

    Some((url, rel))
}
