//! Pagination: page windows, query offsets and ellipsis-compressed link lists.
//!
//! [`page_links`] is the pure windowing function; [`PageUrl`] builds the link targets
//! from the request path while carrying the other query parameters along.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub results_per_page: i64,
    /// Links shown either side of the current page
    pub adjacent_links: i64,
    /// Query string parameter carrying the page number
    pub page_param: String,
    /// Optional absolute domain prefixed to relative paths
    pub domain: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            results_per_page: 20,
            adjacent_links: 2,
            page_param: "page".to_string(),
            domain: String::new(),
        }
    }
}

/// Label of a pagination link: a page, a previous/next control, or a gap marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Page(i64),
    Control,
    Ellipsis,
}

impl Serialize for PageNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageNumber::Page(n) => serializer.serialize_i64(*n),
            PageNumber::Control => serializer.serialize_str(""),
            PageNumber::Ellipsis => serializer.serialize_str("ellipsis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLink {
    pub href: String,
    pub page_number: PageNumber,
}

impl PageLink {
    fn page(href: String, n: i64) -> Self {
        Self {
            href,
            page_number: PageNumber::Page(n),
        }
    }

    fn control(href: String) -> Self {
        Self {
            href,
            page_number: PageNumber::Control,
        }
    }

    fn ellipsis() -> Self {
        Self {
            href: String::new(),
            page_number: PageNumber::Ellipsis,
        }
    }
}

pub fn number_of_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 || total <= 0 {
        return 0;
    }
    (total - 1) / per_page + 1
}

/// Build the link list for `total` results. Empty when everything fits on one page.
///
/// Order: previous, page 1, leading gap, window, trailing gap, last page, next.
/// The leading gap appears from a window start of 3 and the trailing gap while the
/// window ends at least two pages before the last; both thresholds are kept as is.
pub fn page_links<F>(total: i64, per_page: i64, current: i64, adjacency: i64, href: F) -> Vec<PageLink>
where
    F: Fn(i64) -> String,
{
    if total <= 0 || per_page <= 0 || per_page >= total {
        return Vec::new();
    }

    let pages = number_of_pages(total, per_page);
    let current = current.max(1);
    let adjacency = adjacency.max(0);
    let start = current.saturating_sub(adjacency).max(1);
    let end = current.saturating_add(adjacency).min(pages);

    let mut links = Vec::with_capacity(end.saturating_sub(start).saturating_add(7).clamp(0, 64) as usize);

    links.push(PageLink::control(href((current - 1).max(1))));

    if start > 1 {
        links.push(PageLink::page(href(1), 1));
    }

    if start >= 3 {
        links.push(PageLink::ellipsis());
    }

    for n in start..=end {
        links.push(PageLink::page(href(n), n));
    }

    if end <= pages - 2 {
        links.push(PageLink::ellipsis());
    }

    if end < pages {
        links.push(PageLink::page(href(pages), pages));
    }

    if end == pages {
        links.push(PageLink::control(href(pages)));
    } else {
        links.push(PageLink::control(href(current.saturating_add(1))));
    }

    links
}

/// Link target for page N, preserving every other query parameter.
///
/// The page parameter is moved to the end of the query string with an empty value so
/// the number can simply be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    base: String,
}

impl PageUrl {
    pub fn new(path_and_query: &str, config: &PaginationConfig) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };

        let mut base = if path.to_ascii_lowercase().starts_with("http") {
            format!("{}?", path)
        } else {
            format!(
                "{}/{}?",
                config.domain.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut params: Vec<(String, String)> =
            serde_urlencoded::from_str(query).unwrap_or_default();
        params.retain(|(key, _)| key != &config.page_param);
        params.push((config.page_param.clone(), String::new()));

        match serde_urlencoded::to_string(&params) {
            Ok(encoded) => base.push_str(&encoded),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode pagination query string");
                base.push_str(&config.page_param);
                base.push('=');
            }
        }

        Self { base }
    }

    pub fn for_page(&self, n: i64) -> String {
        format!("{}{}", self.base, n)
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }
}

/// Current page read from a raw query string; anything unusable means page 1.
pub fn current_page(query: Option<&str>, page_param: &str) -> i64 {
    query
        .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
        .and_then(|params| {
            params
                .into_iter()
                .find(|(key, _)| key == page_param)
                .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        })
        .unwrap_or(1)
        .max(1)
}

/// Pagination state for a single request.
#[derive(Debug, Clone)]
pub struct Pagination {
    current_page: i64,
    results_per_page: i64,
    adjacent_links: i64,
    url: PageUrl,
}

/// What the renderer receives; absent when pagination is suppressed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationView {
    pub links: Vec<PageLink>,
    pub current_page: i64,
    pub number_of_pages: i64,
    pub page_url: String,
}

impl Pagination {
    /// Read the page number from the request and prepare link targets for its path.
    pub fn from_request(path_and_query: &str, config: &PaginationConfig) -> Self {
        let query = path_and_query.split_once('?').map(|(_, q)| q);

        Self {
            current_page: current_page(query, &config.page_param),
            results_per_page: config.results_per_page.max(1),
            adjacent_links: config.adjacent_links.max(0),
            url: PageUrl::new(path_and_query, config),
        }
    }

    pub fn with_results_per_page(mut self, results_per_page: i64) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }

    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn offset(&self) -> i64 {
        (self.current_page - 1).saturating_mul(self.results_per_page)
    }

    pub fn limit(&self) -> i64 {
        self.results_per_page
    }

    pub fn links(&self, total: i64) -> Vec<PageLink> {
        page_links(
            total,
            self.results_per_page,
            self.current_page,
            self.adjacent_links,
            |n| self.url.for_page(n),
        )
    }

    pub fn view(&self, total: i64) -> Option<PaginationView> {
        let links = self.links(total);
        if links.is_empty() {
            return None;
        }

        Some(PaginationView {
            links,
            current_page: self.current_page,
            number_of_pages: number_of_pages(total, self.results_per_page),
            page_url: self.url.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(links: &[PageLink]) -> Vec<String> {
        links
            .iter()
            .map(|l| match l.page_number {
                PageNumber::Page(n) => n.to_string(),
                PageNumber::Control => format!("ctl:{}", l.href),
                PageNumber::Ellipsis => "...".to_string(),
            })
            .collect()
    }

    fn plain(n: i64) -> String {
        n.to_string()
    }

    #[test]
    fn test_window_in_the_middle_of_25_pages() {
        let links = page_links(500, 20, 10, 2, plain);
        assert_eq!(
            labels(&links),
            vec!["ctl:9", "1", "...", "8", "9", "10", "11", "12", "...", "25", "ctl:11"]
        );
    }

    #[test]
    fn test_first_page_of_five() {
        let links = page_links(100, 20, 1, 2, plain);
        assert_eq!(labels(&links), vec!["ctl:1", "1", "2", "3", "...", "5", "ctl:2"]);
    }

    #[test]
    fn test_last_page_points_next_at_itself() {
        let links = page_links(100, 20, 5, 2, plain);
        assert_eq!(labels(&links), vec!["ctl:4", "1", "...", "3", "4", "5", "ctl:5"]);
    }

    #[test]
    fn test_single_page_of_results_is_suppressed() {
        assert!(page_links(0, 20, 1, 2, plain).is_empty());
        assert!(page_links(20, 20, 1, 2, plain).is_empty());
        assert!(page_links(7, 20, 1, 2, plain).is_empty());
        assert!(!page_links(21, 20, 1, 2, plain).is_empty());
    }

    /// With only page 2 hidden, the leading gap still shows: the window starts at 3.
    #[test]
    fn test_single_skipped_page_still_gets_leading_ellipsis() {
        let links = page_links(60, 10, 4, 1, plain);
        assert_eq!(labels(&links), vec!["ctl:3", "1", "...", "3", "4", "5", "6", "ctl:5"]);
    }

    #[test]
    fn test_ellipses_are_never_adjacent() {
        for total in 1..=300 {
            for current in 1..=16 {
                let links = page_links(total, 20, current, 2, plain);
                for pair in links.windows(2) {
                    assert!(
                        !(pair[0].page_number == PageNumber::Ellipsis
                            && pair[1].page_number == PageNumber::Ellipsis),
                        "total={} current={}",
                        total,
                        current
                    );
                }
            }
        }
    }

    #[test]
    fn test_page_number_serialization() {
        let json = serde_json::to_value(vec![
            PageLink::page("/?page=2".into(), 2),
            PageLink::control("/?page=1".into()),
            PageLink::ellipsis(),
        ])
        .unwrap();
        assert_eq!(json[0]["pageNumber"], 2);
        assert_eq!(json[1]["pageNumber"], "");
        assert_eq!(json[2]["pageNumber"], "ellipsis");
        assert_eq!(json[2]["href"], "");
    }

    #[test]
    fn test_page_url_moves_page_param_last() {
        let config = PaginationConfig::default();
        let url = PageUrl::new("/blog?page=3&tag=rust", &config);
        assert_eq!(url.for_page(4), "/blog?tag=rust&page=4");
    }

    #[test]
    fn test_page_url_prefixes_domain_unless_absolute() {
        let config = PaginationConfig {
            domain: "https://example.com/".into(),
            ..PaginationConfig::default()
        };
        assert_eq!(
            PageUrl::new("news", &config).for_page(2),
            "https://example.com/news?page=2"
        );
        assert_eq!(
            PageUrl::new("http://other.org/list", &config).for_page(2),
            "http://other.org/list?page=2"
        );
    }

    #[test]
    fn test_offset_and_limit_follow_current_page() {
        let config = PaginationConfig::default();
        let pagination = Pagination::from_request("/admin/pages?page=3", &config);
        assert_eq!(pagination.current_page(), 3);
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);

        let fallback = Pagination::from_request("/admin/pages?page=abc", &config);
        assert_eq!(fallback.current_page(), 1);
        assert_eq!(fallback.offset(), 0);
    }

    #[test]
    fn test_largest_page_number_saturates() {
        let config = PaginationConfig::default();
        let pagination = Pagination::from_request("/blog?page=9223372036854775807", &config);
        assert_eq!(pagination.current_page(), i64::MAX);
        assert_eq!(pagination.offset(), i64::MAX);

        let links = pagination.links(500);
        assert_eq!(
            labels(&links),
            vec![
                "ctl:/blog?page=9223372036854775806",
                "1",
                "...",
                "ctl:/blog?page=25"
            ]
        );

        let wide = page_links(500, 20, 3, i64::MAX, plain);
        assert_eq!(wide.len(), 27);
        assert_eq!(number_of_pages(i64::MAX, 20), i64::MAX / 20 + 1);
    }

    #[test]
    fn test_view_is_absent_for_single_page() {
        let pagination = Pagination::from_request("/", &PaginationConfig::default());
        assert!(pagination.view(5).is_none());
        let view = pagination.view(45).unwrap();
        assert_eq!(view.number_of_pages, 3);
        assert_eq!(view.page_url, "/?page=");
    }
}
