//! Write paths for pages, elements, settings and navigation.
//!
//! Every row is written on its own; there is no transaction spanning a submission.
//! Business rules (home slug, self-parenting, collection in use) are checked before the
//! offending row reaches storage.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::content::assembler::PageSource;
use crate::content::toolbox::{clean_url, truncate_html_text};
use crate::db::models::{Collection, SettingCategory};
use crate::error::{AppError, AppResult};

/// Slug of the site root page; it can be neither renamed nor deleted.
pub const HOME_SLUG: &str = "home";

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingInput {
    pub id: Option<i64>,
    pub setting_key: String,
    pub setting_value: Option<String>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInput {
    pub element_id: Option<i64>,
    pub block_key: String,
    pub template: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub collection_id: Option<i64>,
    pub gallery_id: Option<i64>,
    pub embedded: Option<String>,
    pub media_id: Option<i64>,
    #[serde(default)]
    pub settings: Vec<SettingInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePageRequest {
    pub page_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub template: String,
    pub title: String,
    pub sub_title: Option<String>,
    pub page_slug: String,
    pub meta_description: Option<String>,
    pub media_id: Option<i64>,
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub publish_now: bool,
    #[serde(default)]
    pub settings: Vec<SettingInput>,
    #[serde(default)]
    pub elements: Vec<ElementInput>,
}

/// Parent of a submitted navigation item: a saved id, or the client key of an item
/// saved earlier in the same submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Id(i64),
    Key(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItemInput {
    /// Client-side key, unique within the submission
    pub key: String,
    pub nav_id: Option<i64>,
    pub parent: Option<ParentRef>,
    pub page_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub nav_title: Option<String>,
    pub url: Option<String>,
}

// ============================================================================
// Rows handed to storage
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PageWrite {
    pub id: Option<i64>,
    pub collection_id: Option<i64>,
    pub template: String,
    pub title: String,
    pub sub_title: Option<String>,
    pub page_slug: String,
    pub meta_description: Option<String>,
    pub media_id: Option<i64>,
    pub published_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementWrite {
    pub id: Option<i64>,
    pub page_id: i64,
    pub block_key: String,
    pub template: String,
    pub element_sort: i32,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: String,
    pub collection_id: Option<i64>,
    pub gallery_id: Option<i64>,
    pub embedded: Option<String>,
    pub media_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingWrite {
    pub id: Option<i64>,
    pub category: SettingCategory,
    pub page_id: Option<i64>,
    pub element_id: Option<i64>,
    pub setting_key: String,
    pub setting_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationWrite {
    pub id: Option<i64>,
    pub navigator: String,
    pub parent_id: Option<i64>,
    pub sort: i32,
    pub page_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// What a submitted setting row turns into
#[derive(Debug, Clone, PartialEq)]
pub enum SettingAction {
    Save(SettingWrite),
    Delete(i64),
    /// Delete flag on a row that was never saved
    Skip,
}

// ============================================================================
// Storage seams
// ============================================================================

#[async_trait]
pub trait PageWriter: PageSource {
    async fn save_page(&self, page: &PageWrite) -> AppResult<i64>;
    async fn delete_page(&self, id: i64) -> AppResult<()>;
    async fn save_element(&self, element: &ElementWrite) -> AppResult<i64>;
    async fn delete_element(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait SettingWriter: Send + Sync {
    async fn save_setting(&self, setting: &SettingWrite) -> AppResult<i64>;
    async fn delete_setting(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait NavigationWriter: Send + Sync {
    async fn save_navigation(&self, entry: &NavigationWrite) -> AppResult<i64>;
}

// ============================================================================
// Rules
// ============================================================================

/// An explicit date wins; "publish now" without a date means today; otherwise draft.
pub fn resolve_published_date(
    requested: Option<NaiveDate>,
    publish_now: bool,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match requested {
        Some(date) => Some(date),
        None if publish_now => Some(today),
        None => None,
    }
}

pub fn check_home_slug(current_slug: &str, new_slug: &str) -> AppResult<()> {
    if current_slug == HOME_SLUG && new_slug != HOME_SLUG {
        return Err(AppError::integrity("Cannot change home page slug"));
    }
    Ok(())
}

pub fn check_page_deletable(page_slug: &str) -> AppResult<()> {
    if page_slug == HOME_SLUG {
        return Err(AppError::integrity("Cannot delete home page"));
    }
    Ok(())
}

pub fn check_collection_deletable(collection: &Collection) -> AppResult<()> {
    if collection.page_count > 0 {
        return Err(AppError::integrity(format!(
            "Collection '{}' still has {} pages assigned",
            collection.collection_slug, collection.page_count
        )));
    }
    Ok(())
}

/// A navigation entry can be neither its own parent nor parented to the page it links.
pub fn validate_parent(nav_id: Option<i64>, page_id: Option<i64>, parent_id: Option<i64>) -> AppResult<()> {
    let Some(parent) = parent_id else {
        return Ok(());
    };

    if nav_id == Some(parent) || page_id == Some(parent) {
        return Err(AppError::integrity(
            "A navigation element cannot be a child of itself",
        ));
    }
    Ok(())
}

fn resolve_parent(parent: Option<&ParentRef>, assigned: &HashMap<String, i64>) -> AppResult<Option<i64>> {
    match parent {
        None => Ok(None),
        Some(ParentRef::Id(id)) => Ok(Some(*id)),
        Some(ParentRef::Key(key)) if key.is_empty() => Ok(None),
        Some(ParentRef::Key(key)) => match assigned.get(key) {
            Some(id) => Ok(Some(*id)),
            None => Err(AppError::integrity(format!(
                "Navigation parent '{}' must be submitted before its children",
                key
            ))),
        },
    }
}

pub fn setting_action(
    input: &SettingInput,
    category: SettingCategory,
    page_id: Option<i64>,
    element_id: Option<i64>,
) -> SettingAction {
    if input.delete {
        return match input.id {
            Some(id) => SettingAction::Delete(id),
            None => SettingAction::Skip,
        };
    }

    SettingAction::Save(SettingWrite {
        id: input.id,
        category,
        page_id,
        element_id,
        setting_key: input.setting_key.clone(),
        setting_value: input.setting_value.clone(),
    })
}

/// Element rows in submission order, numbered from 1, with fresh excerpts.
pub fn number_elements(page_id: i64, elements: &[ElementInput], excerpt_characters: usize) -> Vec<ElementWrite> {
    elements
        .iter()
        .zip(1..)
        .map(|(input, sort)| ElementWrite {
            id: input.element_id,
            page_id,
            block_key: input.block_key.clone(),
            template: input.template.clone(),
            element_sort: sort,
            title: input.title.clone(),
            excerpt: truncate_html_text(input.content.as_deref().unwrap_or_default(), excerpt_characters),
            content: input.content.clone(),
            collection_id: input.collection_id,
            gallery_id: input.gallery_id,
            embedded: input.embedded.clone(),
            media_id: input.media_id,
        })
        .collect()
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

// ============================================================================
// Operations
// ============================================================================

async fn apply_settings<W: SettingWriter + ?Sized>(
    writer: &W,
    inputs: &[SettingInput],
    category: SettingCategory,
    page_id: Option<i64>,
    element_id: Option<i64>,
) -> AppResult<()> {
    for input in inputs {
        match setting_action(input, category, page_id, element_id) {
            SettingAction::Save(setting) => {
                writer.save_setting(&setting).await?;
            }
            SettingAction::Delete(id) => writer.delete_setting(id).await?,
            SettingAction::Skip => {}
        }
    }
    Ok(())
}

/// Save the page header, its settings and its elements. Returns the page id.
pub async fn save_page<W>(
    writer: &W,
    request: &SavePageRequest,
    today: NaiveDate,
    excerpt_characters: usize,
) -> AppResult<i64>
where
    W: PageWriter + SettingWriter + ?Sized,
{
    let page_slug = clean_url(&request.page_slug);
    if page_slug.is_empty() {
        return Err(AppError::BadRequest("Page slug is required".into()));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest("Page title is required".into()));
    }

    if let Some(id) = request.page_id {
        let existing = writer
            .page_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("page {}", id)))?;
        check_home_slug(&existing.page_slug, &page_slug)?;
    }

    let page = PageWrite {
        id: request.page_id,
        collection_id: request.collection_id,
        template: request.template.clone(),
        title: request.title.trim().to_string(),
        sub_title: trimmed(request.sub_title.as_deref()),
        page_slug,
        meta_description: trimmed(request.meta_description.as_deref()),
        media_id: request.media_id,
        published_date: resolve_published_date(request.published_date, request.publish_now, today),
    };
    let page_id = writer.save_page(&page).await?;

    apply_settings(writer, &request.settings, SettingCategory::Page, Some(page_id), None).await?;

    let rows = number_elements(page_id, &request.elements, excerpt_characters);
    for (row, input) in rows.iter().zip(&request.elements) {
        let element_id = writer.save_element(row).await?;
        apply_settings(writer, &input.settings, SettingCategory::Element, None, Some(element_id)).await?;
    }

    tracing::info!(
        page_id,
        slug = %page.page_slug,
        elements = rows.len(),
        "Page saved"
    );

    Ok(page_id)
}

pub async fn delete_page<W: PageWriter + ?Sized>(writer: &W, id: i64) -> AppResult<()> {
    let page = writer
        .page_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("page {}", id)))?;
    check_page_deletable(&page.page_slug)?;

    writer.delete_page(id).await?;
    tracing::info!(page_id = id, slug = %page.page_slug, "Page deleted");
    Ok(())
}

/// Site-level settings (site, contact, social) are saved without a page or element.
pub async fn save_site_settings<W: SettingWriter + ?Sized>(
    writer: &W,
    category: SettingCategory,
    inputs: &[SettingInput],
) -> AppResult<()> {
    if !SettingCategory::site_categories().contains(&category) {
        return Err(AppError::BadRequest(format!(
            "'{}' settings are not site settings",
            category
        )));
    }
    apply_settings(writer, inputs, category, None, None).await
}

/// Save a navigator's items in submission order; returns the ids assigned to each.
pub async fn save_navigation<W: NavigationWriter + ?Sized>(
    writer: &W,
    navigator: &str,
    items: &[NavItemInput],
) -> AppResult<Vec<i64>> {
    let mut assigned: HashMap<String, i64> = HashMap::with_capacity(items.len());
    let mut ids = Vec::with_capacity(items.len());

    for (item, sort) in items.iter().zip(1..) {
        let parent_id = resolve_parent(item.parent.as_ref(), &assigned)?;
        validate_parent(item.nav_id, item.page_id, parent_id)?;

        let entry = NavigationWrite {
            id: item.nav_id,
            navigator: navigator.to_string(),
            parent_id,
            sort,
            page_id: item.page_id,
            collection_id: item.collection_id,
            title: trimmed(item.nav_title.as_deref()),
            url: trimmed(item.url.as_deref()),
        };

        let id = writer.save_navigation(&entry).await?;
        assigned.insert(item.key.clone(), id);
        ids.push(id);
    }

    tracing::info!(navigator = %navigator, items = ids.len(), "Navigation saved");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::memory::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn element(block: &str, title: &str, content: &str) -> ElementInput {
        ElementInput {
            element_id: None,
            block_key: block.into(),
            template: "text".into(),
            title: Some(title.into()),
            content: Some(content.into()),
            collection_id: None,
            gallery_id: None,
            embedded: None,
            media_id: None,
            settings: Vec::new(),
        }
    }

    fn page_request(slug: &str) -> SavePageRequest {
        SavePageRequest {
            page_id: None,
            collection_id: None,
            template: "home".into(),
            title: " Welcome ".into(),
            sub_title: None,
            page_slug: slug.into(),
            meta_description: Some("  ".into()),
            media_id: None,
            published_date: None,
            publish_now: false,
            settings: Vec::new(),
            elements: Vec::new(),
        }
    }

    fn nav_item(key: &str, parent: Option<ParentRef>, page_id: Option<i64>) -> NavItemInput {
        NavItemInput {
            key: key.into(),
            nav_id: None,
            parent,
            page_id,
            collection_id: None,
            nav_title: None,
            url: None,
        }
    }

    #[test]
    fn test_published_date_resolution() {
        let explicit = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert_eq!(resolve_published_date(explicit, true, today()), explicit);
        assert_eq!(resolve_published_date(None, true, today()), Some(today()));
        assert_eq!(resolve_published_date(None, false, today()), None);
    }

    #[test]
    fn test_home_slug_is_protected() {
        assert!(check_home_slug("home", "home").is_ok());
        assert!(matches!(check_home_slug("home", "start"), Err(AppError::Integrity(_))));
        assert!(check_home_slug("about", "about-us").is_ok());
        assert!(check_page_deletable("home").is_err());
    }

    #[test]
    fn test_elements_are_numbered_in_submission_order() {
        let inputs = vec![
            element("body", "C", "<p>third letter</p>"),
            element("body", "A", "<p>first letter</p>"),
            element("body", "B", "<p>second letter</p>"),
        ];
        let rows = number_elements(5, &inputs, 60);

        let order: Vec<_> = rows
            .iter()
            .map(|r| (r.title.as_deref().unwrap(), r.element_sort))
            .collect();
        assert_eq!(order, vec![("C", 1), ("A", 2), ("B", 3)]);
        assert_eq!(rows[0].excerpt, "third letter");
        assert!(rows.iter().all(|r| r.page_id == 5));
    }

    #[test]
    fn test_setting_delete_flag_routes_to_delete() {
        let mut input = SettingInput {
            id: Some(3),
            setting_key: "color".into(),
            setting_value: Some("red".into()),
            delete: true,
        };
        assert_eq!(
            setting_action(&input, SettingCategory::Page, Some(1), None),
            SettingAction::Delete(3)
        );

        input.id = None;
        assert_eq!(
            setting_action(&input, SettingCategory::Page, Some(1), None),
            SettingAction::Skip
        );

        input.delete = false;
        match setting_action(&input, SettingCategory::Element, None, Some(8)) {
            SettingAction::Save(write) => {
                assert_eq!(write.element_id, Some(8));
                assert_eq!(write.category, SettingCategory::Element);
            }
            other => panic!("expected save, got {:?}", other),
        }
    }

    #[test]
    fn test_self_parent_is_rejected() {
        assert!(validate_parent(Some(4), Some(9), Some(4)).is_err());
        assert!(validate_parent(None, Some(9), Some(9)).is_err());
        assert!(validate_parent(Some(4), Some(9), Some(2)).is_ok());
        assert!(validate_parent(Some(4), Some(4), None).is_ok());
    }

    #[tokio::test]
    async fn test_self_parented_item_never_reaches_storage() {
        let store = MemoryStore::default();
        let items = vec![nav_item("a", Some(ParentRef::Id(7)), Some(7))];

        let err = save_navigation(&store, "main", &items).await.unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));
        assert!(store.navigation().is_empty());
    }

    #[tokio::test]
    async fn test_new_children_resolve_parent_by_client_key() {
        let store = MemoryStore::default();
        let items = vec![
            nav_item("0a", None, Some(1)),
            nav_item("0b", Some(ParentRef::Key("0a".into())), Some(2)),
            nav_item("0c", Some(ParentRef::Key("".into())), None),
        ];

        let ids = save_navigation(&store, "main", &items).await.unwrap();
        let saved = store.navigation();

        assert_eq!(saved[1].parent_id, Some(ids[0]));
        assert_eq!(saved[2].parent_id, None);
        let sorts: Vec<_> = saved.iter().map(|n| n.sort).collect();
        assert_eq!(sorts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_parent_key_is_rejected() {
        let store = MemoryStore::default();
        let items = vec![nav_item("0b", Some(ParentRef::Key("0z".into())), Some(2))];
        assert!(save_navigation(&store, "main", &items).await.is_err());
    }

    #[tokio::test]
    async fn test_save_page_cleans_slug_and_publishes_now() {
        let store = MemoryStore::default();
        let mut request = page_request("About Us & More");
        request.publish_now = true;

        let id = save_page(&store, &request, today(), 60).await.unwrap();
        let page = store.page(id).unwrap();

        assert_eq!(page.page_slug, "about-us-and-more");
        assert_eq!(page.title, "Welcome");
        assert_eq!(page.meta_description, None);
        assert_eq!(page.published_date, Some(today()));
    }

    #[tokio::test]
    async fn test_renaming_home_fails_before_saving() {
        let store = MemoryStore::default();
        let id = save_page(&store, &page_request("home"), today(), 60).await.unwrap();

        let mut rename = page_request("start");
        rename.page_id = Some(id);
        let err = save_page(&store, &rename, today(), 60).await.unwrap_err();

        assert!(matches!(err, AppError::Integrity(_)));
        assert_eq!(store.page(id).unwrap().page_slug, "home");
        assert!(delete_page(&store, id).await.is_err());
    }

    #[tokio::test]
    async fn test_save_page_writes_settings_and_element_settings() {
        let store = MemoryStore::default();
        let mut request = page_request("about");
        request.settings = vec![SettingInput {
            id: None,
            setting_key: "heroColor".into(),
            setting_value: Some("dark".into()),
            delete: false,
        }];
        let mut body = element("body", "Intro", "<p>Hi</p>");
        body.settings = vec![SettingInput {
            id: None,
            setting_key: "align".into(),
            setting_value: Some("left".into()),
            delete: false,
        }];
        request.elements = vec![body];

        let page_id = save_page(&store, &request, today(), 60).await.unwrap();
        let settings = store.settings();

        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].page_id, Some(page_id));
        assert_eq!(settings[0].category, "page");
        assert_eq!(settings[1].category, "element");
        assert!(settings[1].element_id.is_some());
    }

    #[tokio::test]
    async fn test_site_settings_reject_page_category() {
        let store = MemoryStore::default();
        assert!(save_site_settings(&store, SettingCategory::Page, &[]).await.is_err());
        assert!(save_site_settings(&store, SettingCategory::Piton, &[]).await.is_err());
        assert!(save_site_settings(&store, SettingCategory::Social, &[]).await.is_ok());
    }

    #[test]
    fn test_collection_with_pages_cannot_be_deleted() {
        let mut collection = Collection {
            id: 1,
            collection_slug: "blog".into(),
            collection_title: "Blog".into(),
            collection_definition: "blog/post".into(),
            page_count: 3,
        };
        assert!(check_collection_deletable(&collection).is_err());
        collection.page_count = 0;
        assert!(check_collection_deletable(&collection).is_ok());
    }

    #[test]
    fn test_parent_ref_accepts_ids_and_keys() {
        let id: ParentRef = serde_json::from_str("12").unwrap();
        let key: ParentRef = serde_json::from_str("\"0x1\"").unwrap();
        assert_eq!(id, ParentRef::Id(12));
        assert_eq!(key, ParentRef::Key("0x1".into()));
    }
}
