//! Page write-back into an existing URL query string.
//!
//! Page changes are written into the URL rather than into session state, so
//! the rewrite must not disturb anything else the user's link carries: every
//! other parameter keeps its raw (still-encoded) text and position.

use url::form_urlencoded;

/// Returns `query` with its `page` parameter set to `page`.
///
/// The first existing `page` pair is replaced in place and any later
/// duplicates are dropped; if there is none, `page=N` is appended. A leading
/// `?` is accepted and not carried into the result.
#[must_use]
pub fn with_page(query: &str, page: u32) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    let page_pair = format!("page={page}");

    let mut replaced = false;
    let mut parts: Vec<&str> = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        if is_page_pair(pair) {
            if !replaced {
                parts.push(&page_pair);
                replaced = true;
            }
            continue;
        }
        parts.push(pair);
    }
    if !replaced {
        parts.push(&page_pair);
    }
    parts.join("&")
}

fn is_page_pair(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == "page")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_page_when_absent() {
        assert_eq!(with_page("keyword=ramen", 2), "keyword=ramen&page=2");
    }

    #[test]
    fn replaces_page_in_place() {
        assert_eq!(
            with_page("keyword=ramen&page=1&genre=G013", 3),
            "keyword=ramen&page=3&genre=G013"
        );
    }

    #[test]
    fn strips_leading_question_mark() {
        assert_eq!(with_page("?keyword=ramen&page=1", 2), "keyword=ramen&page=2");
    }

    #[test]
    fn keeps_raw_encoding_of_other_params() {
        assert_eq!(
            with_page("keyword=ramen+bar&genre=G001,G013&page=1", 2),
            "keyword=ramen+bar&genre=G001,G013&page=2"
        );
    }

    #[test]
    fn drops_duplicate_page_pairs() {
        assert_eq!(
            with_page("page=1&keyword=ramen&page=7", 4),
            "page=4&keyword=ramen"
        );
    }

    #[test]
    fn empty_query_yields_only_page() {
        assert_eq!(with_page("", 1), "page=1");
    }

    #[test]
    fn does_not_touch_keys_that_merely_start_with_page() {
        assert_eq!(
            with_page("keyword=ramen&pagesize=50", 2),
            "keyword=ramen&pagesize=50&page=2"
        );
    }
}
