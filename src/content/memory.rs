//! In-memory sources and writers for exercising the content layer without Postgres.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::content::assembler::{ElementSource, PageSource, SettingsSource};
use crate::content::definitions::{
    DefinitionError, DefinitionResolver, ElementDefinition, NavigatorDefinition, PageDefinition,
    TemplateSummary, TemplateType,
};
use crate::content::save::{
    ElementWrite, NavigationWrite, NavigationWriter, PageWrite, PageWriter, SettingWrite, SettingWriter,
};
use crate::content::settings::SettingDefinition;
use crate::db::models::{Element, Page, Setting};
use crate::error::AppResult;

#[derive(Default)]
struct Tables {
    next_id: i64,
    pages: Vec<Page>,
    elements: Vec<Element>,
    settings: Vec<Setting>,
    navigation: Vec<NavigationWrite>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn page(&self, id: i64) -> Option<Page> {
        let tables = self.tables.lock().unwrap();
        tables.pages.iter().find(|p| p.id == id).cloned()
    }

    pub fn settings(&self) -> Vec<Setting> {
        self.tables.lock().unwrap().settings.clone()
    }

    pub fn navigation(&self) -> Vec<NavigationWrite> {
        self.tables.lock().unwrap().navigation.clone()
    }

    fn published(&self, today: NaiveDate, matches: impl Fn(&Page) -> bool) -> Option<Page> {
        let tables = self.tables.lock().unwrap();
        tables
            .pages
            .iter()
            .find(|p| matches(p) && p.published_date.is_some_and(|d| d <= today))
            .cloned()
    }
}

fn blank_page(id: i64, write: &PageWrite) -> Page {
    Page {
        id,
        collection_id: write.collection_id,
        collection_slug: None,
        collection_title: None,
        page_slug: write.page_slug.clone(),
        template: write.template.clone(),
        title: write.title.clone(),
        sub_title: write.sub_title.clone(),
        meta_description: write.meta_description.clone(),
        published_date: write.published_date,
        media_id: write.media_id,
        media_filename: None,
        media_width: None,
        media_height: None,
        media_feature: None,
        media_caption: None,
        media: None,
        created_date: None,
        updated_date: None,
    }
}

#[async_trait]
impl PageSource for MemoryStore {
    async fn page_by_id(&self, id: i64) -> AppResult<Option<Page>> {
        Ok(self.page(id))
    }

    async fn published_page_by_slug(&self, slug: &str, today: NaiveDate) -> AppResult<Option<Page>> {
        Ok(self.published(today, |p| p.collection_id.is_none() && p.page_slug == slug))
    }

    async fn published_collection_page_by_slug(
        &self,
        collection_slug: &str,
        page_slug: &str,
        today: NaiveDate,
    ) -> AppResult<Option<Page>> {
        Ok(self.published(today, |p| {
            p.collection_slug.as_deref() == Some(collection_slug) && p.page_slug == page_slug
        }))
    }

    async fn active_collection_pages(&self, collection_id: i64, today: NaiveDate) -> AppResult<Vec<Page>> {
        let tables = self.tables.lock().unwrap();
        let mut pages: Vec<Page> = tables
            .pages
            .iter()
            .filter(|p| p.collection_id == Some(collection_id) && p.published_date.is_some_and(|d| d >= today))
            .cloned()
            .collect();
        pages.sort_by(|a, b| (b.published_date, b.id).cmp(&(a.published_date, a.id)));
        Ok(pages)
    }
}

#[async_trait]
impl ElementSource for MemoryStore {
    async fn elements_by_page_id(&self, page_id: i64) -> AppResult<Vec<Element>> {
        self.elements_by_page_ids(&[page_id]).await
    }

    async fn elements_by_page_ids(&self, page_ids: &[i64]) -> AppResult<Vec<Element>> {
        let tables = self.tables.lock().unwrap();
        let mut elements: Vec<Element> = tables
            .elements
            .iter()
            .filter(|e| page_ids.contains(&e.page_id))
            .cloned()
            .collect();
        elements.sort_by(|a, b| {
            (a.block_key.as_str(), a.element_sort).cmp(&(b.block_key.as_str(), b.element_sort))
        });
        Ok(elements)
    }
}

#[async_trait]
impl SettingsSource for MemoryStore {
    async fn page_and_element_settings(&self, page_id: i64) -> AppResult<Vec<Setting>> {
        self.page_and_element_settings_in(&[page_id]).await
    }

    async fn page_and_element_settings_in(&self, page_ids: &[i64]) -> AppResult<Vec<Setting>> {
        let tables = self.tables.lock().unwrap();
        let element_ids: Vec<i64> = tables
            .elements
            .iter()
            .filter(|e| page_ids.contains(&e.page_id))
            .map(|e| e.id)
            .collect();

        Ok(tables
            .settings
            .iter()
            .filter(|s| {
                s.page_id.is_some_and(|id| page_ids.contains(&id))
                    || s.element_id.is_some_and(|id| element_ids.contains(&id))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PageWriter for MemoryStore {
    async fn save_page(&self, page: &PageWrite) -> AppResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = match page.id {
            Some(id) => id,
            None => tables.next_id(),
        };
        tables.pages.retain(|p| p.id != id);
        tables.pages.push(blank_page(id, page));
        Ok(id)
    }

    async fn delete_page(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.pages.retain(|p| p.id != id);
        tables.elements.retain(|e| e.page_id != id);
        Ok(())
    }

    async fn save_element(&self, element: &ElementWrite) -> AppResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = match element.id {
            Some(id) => id,
            None => tables.next_id(),
        };
        tables.elements.retain(|e| e.id != id);
        tables.elements.push(Element {
            id,
            page_id: element.page_id,
            block_key: element.block_key.clone(),
            template: element.template.clone(),
            element_sort: element.element_sort,
            title: element.title.clone(),
            content: element.content.clone(),
            excerpt: Some(element.excerpt.clone()),
            collection_id: element.collection_id,
            gallery_id: element.gallery_id,
            embedded: element.embedded.clone(),
            media_id: element.media_id,
            media_filename: None,
            media_width: None,
            media_height: None,
            media_feature: None,
            media_caption: None,
            media: None,
            created_date: None,
            updated_date: None,
        });
        Ok(id)
    }

    async fn delete_element(&self, id: i64) -> AppResult<()> {
        self.tables.lock().unwrap().elements.retain(|e| e.id != id);
        Ok(())
    }
}

#[async_trait]
impl SettingWriter for MemoryStore {
    async fn save_setting(&self, setting: &SettingWrite) -> AppResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = match setting.id {
            Some(id) => id,
            None => tables.next_id(),
        };
        let row = Setting {
            id,
            category: setting.category.as_str().to_string(),
            page_id: setting.page_id,
            element_id: setting.element_id,
            setting_key: setting.setting_key.clone(),
            setting_value: setting.setting_value.clone(),
            created_by: None,
            created_date: None,
            updated_by: None,
            updated_date: None,
        };
        match tables.settings.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = row,
            None => tables.settings.push(row),
        }
        Ok(id)
    }

    async fn delete_setting(&self, id: i64) -> AppResult<()> {
        self.tables.lock().unwrap().settings.retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl NavigationWriter for MemoryStore {
    async fn save_navigation(&self, entry: &NavigationWrite) -> AppResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = match entry.id {
            Some(id) => id,
            None => tables.next_id(),
        };
        let mut saved = entry.clone();
        saved.id = Some(id);
        tables.navigation.push(saved);
        Ok(id)
    }
}

/// Definitions held in maps instead of files
#[derive(Default)]
pub struct MemoryDefinitions {
    pub pages: HashMap<String, PageDefinition>,
    pub elements: HashMap<String, ElementDefinition>,
    pub site_settings: Vec<SettingDefinition>,
    pub navigators: Vec<NavigatorDefinition>,
}

fn missing(template: &str) -> DefinitionError {
    DefinitionError {
        template: template.to_string(),
        messages: vec![format!("Unable to read file: {}.json", template)],
    }
}

impl DefinitionResolver for MemoryDefinitions {
    fn page(&self, template: &str) -> Result<PageDefinition, DefinitionError> {
        self.pages.get(template).cloned().ok_or_else(|| missing(template))
    }

    fn element(&self, template: &str) -> Result<ElementDefinition, DefinitionError> {
        self.elements.get(template).cloned().ok_or_else(|| missing(template))
    }

    fn site_settings(&self) -> Result<Vec<SettingDefinition>, DefinitionError> {
        Ok(self.site_settings.clone())
    }

    fn navigators(&self) -> Result<Vec<NavigatorDefinition>, DefinitionError> {
        Ok(self.navigators.clone())
    }

    fn page_templates(&self, kind: Option<TemplateType>) -> Result<Vec<TemplateSummary>, DefinitionError> {
        let mut templates: Vec<TemplateSummary> = self
            .pages
            .iter()
            .filter(|(_, d)| kind.map_or(true, |k| k == d.template_type))
            .map(|(filename, d)| TemplateSummary {
                filename: filename.clone(),
                name: d.template_name.clone(),
                description: d.template_description.clone(),
            })
            .collect();
        templates.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(templates)
    }

    fn element_templates(&self) -> Result<Vec<TemplateSummary>, DefinitionError> {
        let mut templates: Vec<TemplateSummary> = self
            .elements
            .iter()
            .map(|(filename, d)| TemplateSummary {
                filename: filename.clone(),
                name: d.element_name.clone(),
                description: d.element_description.clone(),
            })
            .collect();
        templates.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(templates)
    }
}
