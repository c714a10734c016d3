//! Page assembly: a page row, its template definition, its settings and its elements
//! grouped into blocks, ready for the renderer.
//!
//! Two views are produced. The editor view ([`EditablePage`]) merges settings against
//! the template definitions and reports definition problems as alerts. The public view
//! ([`PublishedPage`]) only exposes saved values as `settings[key]` maps.

use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

use crate::content::alerts::Alert;
use crate::content::definitions::{DefinitionError, DefinitionResolver, ElementDefinition, PageDefinition};
use crate::content::settings::{self, MergedSetting};
use crate::db::models::{Element, Page, PublishedStatus, Setting, SettingCategory};
use crate::error::{AppError, AppResult};

// ============================================================================
// Sources
// ============================================================================

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn page_by_id(&self, id: i64) -> AppResult<Option<Page>>;

    /// Published page outside any collection
    async fn published_page_by_slug(&self, slug: &str, today: NaiveDate) -> AppResult<Option<Page>>;

    async fn published_collection_page_by_slug(
        &self,
        collection_slug: &str,
        page_slug: &str,
        today: NaiveDate,
    ) -> AppResult<Option<Page>>;

    /// Pages of a collection dated today or later, newest first
    async fn active_collection_pages(&self, collection_id: i64, today: NaiveDate) -> AppResult<Vec<Page>>;
}

#[async_trait]
pub trait ElementSource: Send + Sync {
    /// Elements of a page ordered by block key then sort order
    async fn elements_by_page_id(&self, page_id: i64) -> AppResult<Vec<Element>>;

    /// Elements of several pages, same ordering
    async fn elements_by_page_ids(&self, page_ids: &[i64]) -> AppResult<Vec<Element>>;
}

#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Page settings of the page and element settings of all its elements
    async fn page_and_element_settings(&self, page_id: i64) -> AppResult<Vec<Setting>>;

    async fn page_and_element_settings_in(&self, page_ids: &[i64]) -> AppResult<Vec<Setting>>;
}

// ============================================================================
// Assembled views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledElement<S> {
    #[serde(flatten)]
    pub element: Element,
    pub settings: S,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledPage<S> {
    #[serde(flatten)]
    pub page: Page,
    pub settings: S,
    pub blocks: IndexMap<String, Vec<AssembledElement<S>>>,
}

pub type SettingsMap = IndexMap<String, Option<String>>;

pub type PublishedPage = AssembledPage<SettingsMap>;

/// Editor view of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditablePage {
    #[serde(flatten)]
    pub content: AssembledPage<Vec<MergedSetting>>,
    pub published_status: PublishedStatus,
    pub definition: Option<PageDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

/// Group elements by block key, keeping the order they arrive in.
pub fn group_blocks<T, F>(elements: Vec<T>, block_key: F) -> IndexMap<String, Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let mut blocks: IndexMap<String, Vec<T>> = IndexMap::new();
    for element in elements {
        let key = block_key(&element).to_string();
        blocks.entry(key).or_default().push(element);
    }
    blocks
}

fn is_page_setting(setting: &Setting, page_id: i64) -> bool {
    setting.category == SettingCategory::Page.as_str() && setting.page_id == Some(page_id)
}

fn is_element_setting(setting: &Setting, element_id: i64) -> bool {
    setting.category == SettingCategory::Element.as_str() && setting.element_id == Some(element_id)
}

// ============================================================================
// Assembler
// ============================================================================

pub struct ContentAssembler<'a> {
    pages: &'a dyn PageSource,
    elements: &'a dyn ElementSource,
    settings: &'a dyn SettingsSource,
    definitions: &'a dyn DefinitionResolver,
}

impl<'a> ContentAssembler<'a> {
    pub fn new(
        pages: &'a dyn PageSource,
        elements: &'a dyn ElementSource,
        settings: &'a dyn SettingsSource,
        definitions: &'a dyn DefinitionResolver,
    ) -> Self {
        Self {
            pages,
            elements,
            settings,
            definitions,
        }
    }

    /// Editor view of page `page_id`.
    ///
    /// A template whose definition cannot be loaded does not stop assembly: the saved
    /// settings are shown as they are and an alert explains the problem.
    pub async fn assemble(&self, page_id: i64, today: NaiveDate) -> AppResult<EditablePage> {
        let page = self
            .pages
            .page_by_id(page_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("page {}", page_id)))?;

        let mut alerts = Vec::new();
        let definition = match self.definitions.page(&page.template) {
            Ok(definition) => Some(definition),
            Err(err) => {
                record_definition_error(&err, &mut alerts);
                None
            }
        };

        let saved = self.settings.page_and_element_settings(page_id).await?;
        let (page_saved, element_saved): (Vec<Setting>, Vec<Setting>) =
            saved.into_iter().partition(|s| is_page_setting(s, page_id));

        let page_settings = settings::merge_or_passthrough(
            &page_saved,
            definition.as_ref().map(|d| d.settings.as_slice()),
            None,
        );

        let mut element_definitions: HashMap<String, Option<ElementDefinition>> = HashMap::new();
        let mut elements = Vec::new();
        for element in self.elements.elements_by_page_id(page_id).await? {
            if !element_definitions.contains_key(&element.template) {
                let loaded = match self.definitions.element(&element.template) {
                    Ok(definition) => Some(definition),
                    Err(err) => {
                        record_definition_error(&err, &mut alerts);
                        None
                    }
                };
                element_definitions.insert(element.template.clone(), loaded);
            }

            let defined = element_definitions
                .get(&element.template)
                .and_then(Option::as_ref)
                .map(|d| d.settings.as_slice());
            let saved: Vec<Setting> = element_saved
                .iter()
                .filter(|s| is_element_setting(s, element.id))
                .cloned()
                .collect();

            elements.push(AssembledElement {
                settings: settings::merge_or_passthrough(
                    &saved,
                    defined,
                    None,
                ),
                element,
            });
        }

        tracing::debug!(
            page_id,
            template = %page.template,
            elements = elements.len(),
            alerts = alerts.len(),
            "Assembled page for editing"
        );

        Ok(EditablePage {
            published_status: page.published_status(today),
            content: AssembledPage {
                page,
                settings: page_settings,
                blocks: group_blocks(elements, |e| e.element.block_key.as_str()),
            },
            definition,
            alerts,
        })
    }

    /// Public view of the page at `/{slug}` or `/{collection}/{slug}`.
    pub async fn assemble_published(
        &self,
        slug: &str,
        page_slug: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<PublishedPage> {
        let page = match page_slug {
            None => self.pages.published_page_by_slug(slug, today).await?,
            Some(page_slug) => {
                self.pages
                    .published_collection_page_by_slug(slug, page_slug, today)
                    .await?
            }
        };
        let path = match page_slug {
            Some(page_slug) => format!("{}/{}", slug, page_slug),
            None => slug.to_string(),
        };
        let page = page.ok_or_else(|| AppError::not_found(format!("page '{}'", path)))?;

        let saved = self.settings.page_and_element_settings(page.id).await?;
        let elements = self.elements.elements_by_page_id(page.id).await?;

        Ok(publish(page, elements, &saved))
    }

    /// Every active page of a collection, assembled for the renderer.
    ///
    /// Elements and settings of all pages are loaded with one query each and then
    /// distributed to their pages.
    pub async fn assemble_active(&self, collection_id: i64, today: NaiveDate) -> AppResult<Vec<PublishedPage>> {
        let pages = self.pages.active_collection_pages(collection_id, today).await?;
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let page_ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
        let elements = self.elements.elements_by_page_ids(&page_ids).await?;
        let saved = self.settings.page_and_element_settings_in(&page_ids).await?;

        let mut by_page: HashMap<i64, Vec<Element>> = HashMap::with_capacity(pages.len());
        for element in elements {
            by_page.entry(element.page_id).or_default().push(element);
        }

        tracing::debug!(
            collection_id,
            pages = page_ids.len(),
            settings = saved.len(),
            "Assembled active collection pages"
        );

        Ok(pages
            .into_iter()
            .map(|page| {
                let elements = by_page.remove(&page.id).unwrap_or_default();
                publish(page, elements, &saved)
            })
            .collect())
    }

    /// Declared settings of a template for a page that does not exist yet, all `new`.
    pub fn blank_settings(&self, template: &str) -> Result<(PageDefinition, Vec<MergedSetting>), DefinitionError> {
        let definition = self.definitions.page(template)?;
        let settings = settings::merge(&[], &definition.settings, None);
        Ok((definition, settings))
    }

    /// Declared settings of an element template for an element about to be added.
    pub fn blank_element_settings(
        &self,
        template: &str,
    ) -> Result<(ElementDefinition, Vec<MergedSetting>), DefinitionError> {
        let definition = self.definitions.element(template)?;
        let settings = settings::merge(&[], &definition.settings, None);
        Ok((definition, settings))
    }
}

/// Public view of one page. `saved` may hold settings of other pages; only the
/// page's own rows and those of its elements are used.
fn publish(page: Page, elements: Vec<Element>, saved: &[Setting]) -> PublishedPage {
    let page_settings = settings::value_map(saved.iter().filter(|s| is_page_setting(s, page.id)));

    let elements: Vec<AssembledElement<SettingsMap>> = elements
        .into_iter()
        .map(|element| AssembledElement {
            settings: settings::value_map(saved.iter().filter(|s| is_element_setting(s, element.id))),
            element,
        })
        .collect();

    AssembledPage {
        page,
        settings: page_settings,
        blocks: group_blocks(elements, |e| e.element.block_key.as_str()),
    }
}

/// Active collection pages of one request, each collection assembled at most once.
pub struct ActiveMenus<'a> {
    assembler: &'a ContentAssembler<'a>,
    today: NaiveDate,
    cache: HashMap<i64, Vec<PublishedPage>>,
}

impl<'a> ActiveMenus<'a> {
    pub fn new(assembler: &'a ContentAssembler<'a>, today: NaiveDate) -> Self {
        Self {
            assembler,
            today,
            cache: HashMap::new(),
        }
    }

    pub async fn get(&mut self, collection_id: i64) -> AppResult<&[PublishedPage]> {
        if !self.cache.contains_key(&collection_id) {
            let pages = self.assembler.assemble_active(collection_id, self.today).await?;
            self.cache.insert(collection_id, pages);
        }

        Ok(self
            .cache
            .get(&collection_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Every requested collection keyed by id, for embedding in a response.
    pub async fn collect(&mut self, collection_ids: &[i64]) -> AppResult<HashMap<i64, Vec<PublishedPage>>> {
        let mut out = HashMap::with_capacity(collection_ids.len());
        for &id in collection_ids {
            out.insert(id, self.get(id).await?.to_vec());
        }
        Ok(out)
    }
}

fn record_definition_error(err: &DefinitionError, alerts: &mut Vec<Alert>) {
    if alerts.iter().any(|a| a.heading == Alert::from(err).heading) {
        return;
    }
    tracing::warn!(
        template = %err.template,
        messages = ?err.messages,
        "Definition could not be loaded"
    );
    alerts.push(Alert::from(err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::alerts::Severity;
    use crate::content::memory::{MemoryDefinitions, MemoryStore};
    use crate::content::save::{self, ElementInput, SavePageRequest, SettingInput};
    use crate::content::settings::{SettingDefinition, SettingStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn setting_def(key: &str, category: &str, default: &str) -> SettingDefinition {
        SettingDefinition {
            key: key.into(),
            label: None,
            input_type: "text".into(),
            default_value: Some(default.into()),
            options: Vec::new(),
            category: Some(category.into()),
            help: None,
            placeholder: None,
        }
    }

    fn definitions() -> MemoryDefinitions {
        let mut definitions = MemoryDefinitions::default();
        definitions.pages.insert(
            "home".into(),
            PageDefinition {
                template_name: "Home".into(),
                template_description: None,
                template_type: crate::content::definitions::TemplateType::Page,
                blocks: Vec::new(),
                settings: vec![
                    setting_def("heroColor", "page", "dark"),
                    setting_def("layout", "page", "wide"),
                ],
            },
        );
        definitions.elements.insert(
            "text".into(),
            ElementDefinition {
                element_name: "Text".into(),
                element_description: None,
                settings: vec![setting_def("align", "element", "left")],
            },
        );
        definitions
    }

    fn element(block: &str, title: &str, template: &str) -> ElementInput {
        ElementInput {
            element_id: None,
            block_key: block.into(),
            template: template.into(),
            title: Some(title.into()),
            content: Some(format!("<p>{} content</p>", title)),
            collection_id: None,
            gallery_id: None,
            embedded: None,
            media_id: None,
            settings: Vec::new(),
        }
    }

    fn request(template: &str, elements: Vec<ElementInput>) -> SavePageRequest {
        SavePageRequest {
            page_id: None,
            collection_id: None,
            template: template.into(),
            title: "About".into(),
            sub_title: None,
            page_slug: "about".into(),
            meta_description: None,
            media_id: None,
            published_date: None,
            publish_now: true,
            settings: vec![
                SettingInput {
                    id: None,
                    setting_key: "heroColor".into(),
                    setting_value: Some("light".into()),
                    delete: false,
                },
                SettingInput {
                    id: None,
                    setting_key: "retired".into(),
                    setting_value: Some("still here".into()),
                    delete: false,
                },
            ],
            elements,
        }
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let store = MemoryStore::default();
        let defs = definitions();
        let assembler = ContentAssembler::new(&store, &store, &store, &defs);

        let err = assembler.assemble(42, today()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_editor_view_merges_settings_and_groups_blocks() {
        let store = MemoryStore::default();
        let defs = definitions();
        let mut body = element("body", "Intro", "text");
        body.settings = vec![SettingInput {
            id: None,
            setting_key: "align".into(),
            setting_value: Some("right".into()),
            delete: false,
        }];
        let elements = vec![element("hero", "Banner", "text"), body];
        let page_id = save::save_page(&store, &request("home", elements), today(), 60)
            .await
            .unwrap();

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let page = assembler.assemble(page_id, today()).await.unwrap();

        assert!(page.alerts.is_empty());
        assert_eq!(page.published_status, PublishedStatus::Published);

        let statuses: Vec<_> = page
            .content
            .settings
            .iter()
            .map(|s| (s.setting_key.as_str(), s.status, s.setting_value.as_deref()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("heroColor", Some(SettingStatus::Merged), Some("light")),
                ("layout", Some(SettingStatus::New), Some("wide")),
                ("retired", Some(SettingStatus::Orphaned), Some("still here")),
            ]
        );

        let keys: Vec<_> = page.content.blocks.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["body", "hero"]);
        let body = &page.content.blocks["body"][0];
        assert_eq!(body.settings[0].setting_value.as_deref(), Some("right"));
        let hero = &page.content.blocks["hero"][0];
        assert_eq!(hero.settings[0].status, Some(SettingStatus::New));
    }

    #[tokio::test]
    async fn test_invalid_definition_is_not_fatal() {
        let store = MemoryStore::default();
        let defs = definitions();
        let elements = vec![element("body", "One", "gone"), element("body", "Two", "gone")];
        let page_id = save::save_page(&store, &request("legacy", elements), today(), 60)
            .await
            .unwrap();

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let page = assembler.assemble(page_id, today()).await.unwrap();

        assert!(page.definition.is_none());
        // One alert for the page template, one for the element template
        assert_eq!(page.alerts.len(), 2);
        assert!(page.alerts.iter().all(|a| a.severity == Severity::Danger));
        assert_eq!(page.content.settings.len(), 2);
        assert!(page.content.settings.iter().all(|s| s.status.is_none()));
    }

    #[tokio::test]
    async fn test_elements_come_back_in_saved_order() {
        let store = MemoryStore::default();
        let defs = definitions();
        let elements = vec![
            element("body", "C", "text"),
            element("body", "A", "text"),
            element("body", "B", "text"),
        ];
        let page_id = save::save_page(&store, &request("home", elements), today(), 60)
            .await
            .unwrap();

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let page = assembler.assemble(page_id, today()).await.unwrap();

        let order: Vec<_> = page.content.blocks["body"]
            .iter()
            .map(|e| (e.element.title.as_deref().unwrap(), e.element.element_sort))
            .collect();
        assert_eq!(order, vec![("C", 1), ("A", 2), ("B", 3)]);
    }

    #[tokio::test]
    async fn test_published_view_uses_saved_values_only() {
        let store = MemoryStore::default();
        let defs = definitions();
        let page_id = save::save_page(
            &store,
            &request("home", vec![element("body", "Intro", "text")]),
            today(),
            60,
        )
        .await
        .unwrap();

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let page = assembler
            .assemble_published("about", None, today())
            .await
            .unwrap();

        assert_eq!(page.page.id, page_id);
        assert_eq!(page.settings["heroColor"].as_deref(), Some("light"));
        assert!(!page.settings.contains_key("layout"));
        assert!(page.blocks["body"][0].settings.is_empty());

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageSlug"], "about");
        assert_eq!(json["blocks"]["body"][0]["blockKey"], "body");
        assert_eq!(json["settings"]["heroColor"], "light");
    }

    #[tokio::test]
    async fn test_future_page_is_not_published() {
        let store = MemoryStore::default();
        let defs = definitions();
        let mut draft = request("home", Vec::new());
        draft.publish_now = false;
        draft.published_date = today().succ_opt();
        save::save_page(&store, &draft, today(), 60).await.unwrap();

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let err = assembler
            .assemble_published("about", None, today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    fn setting(key: &str, value: &str) -> SettingInput {
        SettingInput {
            id: None,
            setting_key: key.into(),
            setting_value: Some(value.into()),
            delete: false,
        }
    }

    async fn save_menu(
        store: &MemoryStore,
        collection_id: i64,
        slug: &str,
        date: Option<NaiveDate>,
        elements: Vec<ElementInput>,
    ) -> i64 {
        let mut menu = request("home", elements);
        menu.collection_id = Some(collection_id);
        menu.page_slug = slug.into();
        menu.publish_now = false;
        menu.published_date = date;
        menu.settings = vec![setting("heroColor", slug)];
        save::save_page(store, &menu, today(), 60).await.unwrap()
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, d)
    }

    #[tokio::test]
    async fn test_active_pages_start_today_newest_first() {
        let store = MemoryStore::default();
        let defs = definitions();
        save_menu(&store, 9, "yesterday", NaiveDate::from_ymd_opt(2024, 2, 29), Vec::new()).await;
        save_menu(&store, 9, "draft", None, Vec::new()).await;
        let current = save_menu(&store, 9, "current", day(1), Vec::new()).await;
        let upcoming = save_menu(&store, 9, "upcoming", day(8), Vec::new()).await;
        save_menu(&store, 10, "elsewhere", day(1), Vec::new()).await;

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let pages = assembler.assemble_active(9, today()).await.unwrap();

        let ids: Vec<i64> = pages.iter().map(|p| p.page.id).collect();
        assert_eq!(ids, vec![upcoming, current]);
        assert!(assembler.assemble_active(11, today()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_pages_keep_their_own_elements_and_settings() {
        let store = MemoryStore::default();
        let defs = definitions();

        let mut first = element("body", "First", "text");
        first.settings = vec![setting("align", "right")];
        let second = element("body", "Second", "text");
        let lunch = save_menu(&store, 9, "lunch", day(1), vec![first, second]).await;

        let mut banner = element("hero", "Banner", "text");
        banner.settings = vec![setting("align", "center")];
        let dinner = save_menu(&store, 9, "dinner", day(2), vec![banner]).await;

        let assembler = ContentAssembler::new(&store, &store, &store, &defs);
        let pages = assembler.assemble_active(9, today()).await.unwrap();
        assert_eq!(pages.len(), 2);

        let dinner_page = pages.iter().find(|p| p.page.id == dinner).unwrap();
        assert_eq!(dinner_page.settings["heroColor"].as_deref(), Some("dinner"));
        assert_eq!(dinner_page.blocks.keys().collect::<Vec<_>>(), vec!["hero"]);
        assert_eq!(dinner_page.blocks["hero"][0].settings["align"].as_deref(), Some("center"));

        let lunch_page = pages.iter().find(|p| p.page.id == lunch).unwrap();
        assert_eq!(lunch_page.settings["heroColor"].as_deref(), Some("lunch"));
        assert_eq!(lunch_page.settings.len(), 1);
        let body = &lunch_page.blocks["body"];
        let titles: Vec<_> = body.iter().map(|e| e.element.title.as_deref().unwrap()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(body[0].settings["align"].as_deref(), Some("right"));
        assert!(body[1].settings.is_empty());
        assert!(!lunch_page.blocks.contains_key("hero"));
    }

    struct CountingPages<'a> {
        inner: &'a MemoryStore,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl PageSource for CountingPages<'_> {
        async fn page_by_id(&self, id: i64) -> AppResult<Option<Page>> {
            self.inner.page_by_id(id).await
        }

        async fn published_page_by_slug(&self, slug: &str, today: NaiveDate) -> AppResult<Option<Page>> {
            self.inner.published_page_by_slug(slug, today).await
        }

        async fn published_collection_page_by_slug(
            &self,
            collection_slug: &str,
            page_slug: &str,
            today: NaiveDate,
        ) -> AppResult<Option<Page>> {
            self.inner
                .published_collection_page_by_slug(collection_slug, page_slug, today)
                .await
        }

        async fn active_collection_pages(&self, collection_id: i64, today: NaiveDate) -> AppResult<Vec<Page>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.active_collection_pages(collection_id, today).await
        }
    }

    #[tokio::test]
    async fn test_active_menus_assemble_each_collection_once() {
        let store = MemoryStore::default();
        let defs = definitions();
        save_menu(&store, 9, "lunch", day(1), vec![element("body", "Soup", "text")]).await;

        let pages = CountingPages {
            inner: &store,
            calls: Default::default(),
        };
        let assembler = ContentAssembler::new(&pages, &store, &store, &defs);
        let mut menus = ActiveMenus::new(&assembler, today());

        assert_eq!(menus.get(9).await.unwrap().len(), 1);
        assert_eq!(menus.get(9).await.unwrap().len(), 1);
        let all = menus.collect(&[9, 12]).await.unwrap();
        assert_eq!(all[&9].len(), 1);
        assert!(all[&12].is_empty());
        assert_eq!(pages.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_group_blocks_keeps_arrival_order() {
        let blocks = group_blocks(vec![("a", 1), ("b", 1), ("a", 2)], |e| e.0);
        assert_eq!(blocks["a"], vec![("a", 1), ("a", 2)]);
        assert_eq!(blocks.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_blank_settings_are_all_new() {
        let store = MemoryStore::default();
        let defs = definitions();
        let assembler = ContentAssembler::new(&store, &store, &store, &defs);

        let (_, settings) = assembler.blank_settings("home").unwrap();
        assert!(settings.iter().all(|s| s.status == Some(SettingStatus::New)));
        assert!(assembler.blank_element_settings("nope").is_err());
    }
}
