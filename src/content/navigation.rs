//! Navigation trees built from flat, pre-joined navigator rows.
//!
//! Each level rescans the same row list for entries whose parent matches, so a row
//! skipped by the publish filter takes its whole subtree with it: children of an
//! unpublished page are unreachable rather than promoted.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::db::models::NavigationRow;
use crate::error::AppResult;

/// A navigation entry ready for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavNode {
    #[serde(flatten)]
    pub row: NavigationRow,
    /// Nav title, else page title, else collection title
    pub title: Option<String>,
    pub href: Option<String>,
    pub current_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_nav: Option<Vec<NavNode>>,
}

impl NavNode {
    fn new(row: &NavigationRow, current_route: Option<&str>, child_nav: Option<Vec<NavNode>>) -> Self {
        let title = row
            .nav_title
            .clone()
            .or_else(|| row.page_title.clone())
            .or_else(|| row.collection_title.clone());

        let current_page = match (current_route, route_slug(row)) {
            (Some(current), Some(slug)) => current == slug,
            _ => false,
        };

        Self {
            href: nav_href(row),
            title,
            current_page,
            child_nav,
            row: row.clone(),
        }
    }
}

/// Link target of an entry: explicit url, collection detail path, or page path.
pub fn nav_href(row: &NavigationRow) -> Option<String> {
    if let Some(url) = &row.url {
        return Some(url.clone());
    }

    match (&row.collection_slug, &row.page_slug) {
        (Some(collection), Some(page)) => Some(format!("/{}/{}", collection, page)),
        (_, Some(page)) => Some(format!("/{}", page)),
        _ => None,
    }
}

/// The route this entry is matched against: `page` or `collection/page`.
fn route_slug(row: &NavigationRow) -> Option<String> {
    match (&row.collection_slug, &row.page_slug) {
        (Some(collection), Some(page)) => Some(format!("{}/{}", collection, page)),
        (_, Some(page)) => Some(page.clone()),
        _ => None,
    }
}

/// Current route as compared with entry slugs; the site root is the `home` page.
pub fn current_route_slug(path: &str) -> String {
    if path == "/" || path.is_empty() {
        "home".to_string()
    } else {
        path.trim_start_matches('/').to_string()
    }
}

/// Rows pointing at a page are only shown once that page is published.
fn is_visible(row: &NavigationRow, today: NaiveDate) -> bool {
    row.page_id.is_none() || row.published_date.is_some_and(|date| date <= today)
}

/// Build the tree under the top level (`parent_id` null). `None` when nothing matched.
pub fn build_navigation(
    rows: &[NavigationRow],
    current_route: Option<&str>,
    only_published: bool,
    today: NaiveDate,
) -> Option<Vec<NavNode>> {
    let mut ancestors = Vec::new();
    build_level(rows, current_route, only_published, today, None, &mut ancestors)
}

fn build_level(
    rows: &[NavigationRow],
    current_route: Option<&str>,
    only_published: bool,
    today: NaiveDate,
    parent_id: Option<i64>,
    ancestors: &mut Vec<i64>,
) -> Option<Vec<NavNode>> {
    if rows.is_empty() {
        return None;
    }

    let mut level = Vec::new();
    for row in rows {
        if only_published && !is_visible(row, today) {
            continue;
        }

        // An entry never appears inside its own subtree
        if row.parent_id != parent_id || ancestors.contains(&row.id) {
            continue;
        }

        ancestors.push(row.id);
        let children = build_level(rows, current_route, only_published, today, Some(row.id), ancestors);
        ancestors.pop();

        level.push(NavNode::new(row, current_route, children));
    }

    if level.is_empty() {
        None
    } else {
        Some(level)
    }
}

/// Same result as [`build_navigation`], from a single `parent -> children` index.
pub fn build_navigation_indexed(
    rows: &[NavigationRow],
    current_route: Option<&str>,
    only_published: bool,
    today: NaiveDate,
) -> Option<Vec<NavNode>> {
    let mut children: HashMap<Option<i64>, Vec<&NavigationRow>> = HashMap::new();
    for row in rows.iter().filter(|row| !only_published || is_visible(row, today)) {
        children.entry(row.parent_id).or_default().push(row);
    }

    let mut ancestors = Vec::new();
    materialize(&children, None, current_route, &mut ancestors)
}

fn materialize(
    children: &HashMap<Option<i64>, Vec<&NavigationRow>>,
    parent_id: Option<i64>,
    current_route: Option<&str>,
    ancestors: &mut Vec<i64>,
) -> Option<Vec<NavNode>> {
    let rows = children.get(&parent_id)?;

    let mut level = Vec::with_capacity(rows.len());
    for row in rows {
        if ancestors.contains(&row.id) {
            continue;
        }
        ancestors.push(row.id);
        let child_nav = materialize(children, Some(row.id), current_route, ancestors);
        ancestors.pop();
        level.push(NavNode::new(row, current_route, child_nav));
    }

    if level.is_empty() {
        None
    } else {
        Some(level)
    }
}

/// Where navigator rows come from
#[async_trait]
pub trait NavigationSource: Send + Sync {
    /// Rows with collection entries expanded into their detail pages
    async fn navigation_rows(&self, navigator: &str) -> AppResult<Vec<NavigationRow>>;
}

/// Navigators of one request, each built at most once.
pub struct Navigators<'a, S: NavigationSource + ?Sized> {
    source: &'a S,
    current_route: String,
    today: NaiveDate,
    cache: HashMap<String, Option<Vec<NavNode>>>,
}

impl<'a, S: NavigationSource + ?Sized> Navigators<'a, S> {
    pub fn new(source: &'a S, path: &str, today: NaiveDate) -> Self {
        Self {
            source,
            current_route: current_route_slug(path),
            today,
            cache: HashMap::new(),
        }
    }

    pub async fn get(&mut self, navigator: &str) -> AppResult<Option<&[NavNode]>> {
        if !self.cache.contains_key(navigator) {
            let rows = self.source.navigation_rows(navigator).await?;
            let tree = build_navigation(&rows, Some(&self.current_route), true, self.today);
            tracing::debug!(
                navigator = %navigator,
                rows = rows.len(),
                "Built navigator"
            );
            self.cache.insert(navigator.to_string(), tree);
        }

        Ok(self
            .cache
            .get(navigator)
            .and_then(|tree| tree.as_deref()))
    }

    /// Every requested navigator, keyed by name, for embedding in a response.
    pub async fn collect(
        &mut self,
        names: &[String],
    ) -> AppResult<HashMap<String, Vec<NavNode>>> {
        let mut out = HashMap::with_capacity(names.len());
        for name in names {
            let tree = self.get(name).await?.map(<[NavNode]>::to_vec).unwrap_or_default();
            out.insert(name.clone(), tree);
        }
        Ok(out)
    }
}
