//! Template definitions: the JSON files declaring a template's blocks and settings.
//!
//! Layout under the definitions root:
//!
//! ```text
//! templates/pages/{template}.json
//! templates/elements/{template}.json
//! definitions/navigation.json
//! definitions/siteSettings.json
//! ```
//!
//! Loading never stops at the first problem; every message found is returned in the
//! [`DefinitionError`] so the editor can show all of them at once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::content::settings::SettingDefinition;

lazy_static::lazy_static! {
    /// Template names are relative paths without extension, e.g. `blog/post`
    static ref TEMPLATE_NAME: Regex = Regex::new(r"^[a-zA-Z0-9/]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid definition '{template}': {}", .messages.join("; "))]
pub struct DefinitionError {
    pub template: String,
    pub messages: Vec<String>,
}

impl DefinitionError {
    fn new(template: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            template: template.into(),
            messages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Page,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub element_type_default: Option<String>,
    #[serde(default)]
    pub element_type_options: Vec<String>,
    #[serde(default)]
    pub element_count_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    pub template_name: String,
    #[serde(default)]
    pub template_description: Option<String>,
    #[serde(default = "default_template_type")]
    pub template_type: TemplateType,
    #[serde(default)]
    pub blocks: Vec<BlockDefinition>,
    #[serde(default)]
    pub settings: Vec<SettingDefinition>,
}

fn default_template_type() -> TemplateType {
    TemplateType::Page
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    pub element_name: String,
    #[serde(default)]
    pub element_description: Option<String>,
    #[serde(default)]
    pub settings: Vec<SettingDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorDefinition {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NavigationFile {
    #[serde(default)]
    navigators: Vec<NavigatorDefinition>,
}

#[derive(Debug, Deserialize)]
struct SiteSettingsFile {
    #[serde(default)]
    settings: Vec<SettingDefinition>,
}

/// Available template, for "new page" and "add element" choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub filename: String,
    pub name: String,
    pub description: Option<String>,
}

/// Lookup of template definitions by name
pub trait DefinitionResolver: Send + Sync {
    fn page(&self, template: &str) -> Result<PageDefinition, DefinitionError>;

    fn element(&self, template: &str) -> Result<ElementDefinition, DefinitionError>;

    fn site_settings(&self) -> Result<Vec<SettingDefinition>, DefinitionError>;

    fn navigators(&self) -> Result<Vec<NavigatorDefinition>, DefinitionError>;

    /// Page templates, optionally limited to one template type
    fn page_templates(&self, kind: Option<TemplateType>) -> Result<Vec<TemplateSummary>, DefinitionError>;

    fn element_templates(&self) -> Result<Vec<TemplateSummary>, DefinitionError>;
}

/// Definitions read from JSON files on disk
#[derive(Debug, Clone)]
pub struct JsonDefinitions {
    root: PathBuf,
}

impl JsonDefinitions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pages_dir(&self) -> PathBuf {
        self.root.join("templates").join("pages")
    }

    fn elements_dir(&self) -> PathBuf {
        self.root.join("templates").join("elements")
    }

    fn read<T: serde::de::DeserializeOwned>(&self, name: &str, path: &Path) -> Result<T, DefinitionError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DefinitionError::new(name, vec![format!("Unable to read file {}: {}", path.display(), e)])
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            DefinitionError::new(name, vec![format!("[{}:{}] {}", e.line(), e.column(), e)])
        })
    }

    fn template_path(&self, dir: PathBuf, template: &str) -> Result<PathBuf, DefinitionError> {
        if !TEMPLATE_NAME.is_match(template) || template.starts_with('/') {
            return Err(DefinitionError::new(
                template,
                vec![format!("Invalid template name '{}'", template)],
            ));
        }

        Ok(dir.join(format!("{}.json", template)))
    }

    /// `.json` files under `dir`, as template names relative to it, sorted.
    fn template_names(dir: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            for entry in std::fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    if let Ok(relative) = path.with_extension("").strip_prefix(dir) {
                        let name = relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn list_error(dir: &Path, e: std::io::Error) -> DefinitionError {
        DefinitionError::new(
            dir.display().to_string(),
            vec![format!("Unable to list definitions: {}", e)],
        )
    }
}

impl DefinitionResolver for JsonDefinitions {
    fn page(&self, template: &str) -> Result<PageDefinition, DefinitionError> {
        let path = self.template_path(self.pages_dir(), template)?;
        let definition: PageDefinition = self.read(template, &path)?;

        let messages = validate_page(&definition);
        if messages.is_empty() {
            Ok(definition)
        } else {
            Err(DefinitionError::new(template, messages))
        }
    }

    fn element(&self, template: &str) -> Result<ElementDefinition, DefinitionError> {
        let path = self.template_path(self.elements_dir(), template)?;
        let definition: ElementDefinition = self.read(template, &path)?;

        let mut messages = Vec::new();
        if definition.element_name.trim().is_empty() {
            messages.push("[elementName] must not be empty".to_string());
        }
        messages.extend(validate_settings(&definition.settings));

        if messages.is_empty() {
            Ok(definition)
        } else {
            Err(DefinitionError::new(template, messages))
        }
    }

    fn site_settings(&self) -> Result<Vec<SettingDefinition>, DefinitionError> {
        let path = self.root.join("definitions").join("siteSettings.json");
        let file: SiteSettingsFile = self.read("siteSettings", &path)?;

        let messages = validate_settings(&file.settings);
        if messages.is_empty() {
            Ok(file.settings)
        } else {
            Err(DefinitionError::new("siteSettings", messages))
        }
    }

    fn navigators(&self) -> Result<Vec<NavigatorDefinition>, DefinitionError> {
        let path = self.root.join("definitions").join("navigation.json");
        let file: NavigationFile = self.read("navigation", &path)?;

        let messages: Vec<String> = {
            let mut seen = HashSet::new();
            file.navigators
                .iter()
                .filter(|n| !seen.insert(n.key.as_str()))
                .map(|n| format!("[navigators] duplicate key '{}'", n.key))
                .collect()
        };

        if messages.is_empty() {
            Ok(file.navigators)
        } else {
            Err(DefinitionError::new("navigation", messages))
        }
    }

    fn page_templates(&self, kind: Option<TemplateType>) -> Result<Vec<TemplateSummary>, DefinitionError> {
        let dir = self.pages_dir();
        let names = Self::template_names(&dir).map_err(|e| Self::list_error(&dir, e))?;

        let mut templates = Vec::with_capacity(names.len());
        for name in names {
            let definition: PageDefinition = self.read(&name, &dir.join(format!("{}.json", name)))?;
            if kind.is_some_and(|kind| kind != definition.template_type) {
                continue;
            }
            templates.push(TemplateSummary {
                filename: name,
                name: definition.template_name,
                description: definition.template_description,
            });
        }

        Ok(templates)
    }

    fn element_templates(&self) -> Result<Vec<TemplateSummary>, DefinitionError> {
        let dir = self.elements_dir();
        let names = Self::template_names(&dir).map_err(|e| Self::list_error(&dir, e))?;

        names
            .into_iter()
            .map(|name| {
                let definition: ElementDefinition =
                    self.read(&name, &dir.join(format!("{}.json", name)))?;
                Ok(TemplateSummary {
                    filename: name,
                    name: definition.element_name,
                    description: definition.element_description,
                })
            })
            .collect()
    }
}

fn validate_page(definition: &PageDefinition) -> Vec<String> {
    let mut messages = Vec::new();

    if definition.template_name.trim().is_empty() {
        messages.push("[templateName] must not be empty".to_string());
    }

    let mut keys = HashSet::new();
    for (i, block) in definition.blocks.iter().enumerate() {
        if block.key.trim().is_empty() {
            messages.push(format!("[blocks[{}].key] must not be empty", i));
        } else if !keys.insert(block.key.as_str()) {
            messages.push(format!("[blocks[{}].key] duplicate block key '{}'", i, block.key));
        }
    }

    messages.extend(validate_settings(&definition.settings));
    messages
}

fn validate_settings(settings: &[SettingDefinition]) -> Vec<String> {
    let mut messages = Vec::new();
    let mut keys = HashSet::new();

    for (i, setting) in settings.iter().enumerate() {
        if setting.key.trim().is_empty() {
            messages.push(format!("[settings[{}].key] must not be empty", i));
        } else if !keys.insert(setting.key.as_str()) {
            messages.push(format!("[settings[{}].key] duplicate setting key '{}'", i, setting.key));
        }

        if setting.input_type == "select" && setting.options.is_empty() {
            messages.push(format!("[settings[{}].options] select input requires options", i));
        }
    }

    messages
}
