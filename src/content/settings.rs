//! Settings merge: persisted key/value rows reconciled against a template's declared
//! settings.
//!
//! Declared settings come first, in declaration order, carrying the saved value when one
//! exists (`merged`) or the declared default (`new`). Saved rows whose key is no longer
//! declared follow as `orphaned`, untouched and in their original order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::db::models::Setting;

/// One `{value, name}` pair of a select input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    pub name: String,
}

/// A declared setting as read from a definition file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDefinition {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_input_type")]
    pub input_type: String,
    /// Default value; numbers and booleans in the file are kept as their text form
    #[serde(default, rename = "value", deserialize_with = "optional_scalar_string")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingStatus {
    Merged,
    New,
    Orphaned,
}

/// Unified settings row handed to the settings editors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedSetting {
    pub id: Option<i64>,
    pub category: Option<String>,
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub input_type: Option<String>,
    pub label: Option<String>,
    pub help: Option<String>,
    pub placeholder: Option<String>,
    /// value -> name, for select inputs
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
    /// Absent for saved rows shown without any definition to compare against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SettingStatus>,
    pub created_by: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_by: Option<i64>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl MergedSetting {
    fn from_definition(definition: &SettingDefinition) -> Self {
        let options = if definition.input_type == "select" {
            definition
                .options
                .iter()
                .map(|o| (o.value.clone(), o.name.clone()))
                .collect()
        } else {
            IndexMap::new()
        };

        Self {
            id: None,
            category: definition.category.clone(),
            setting_key: definition.key.clone(),
            setting_value: definition.default_value.clone(),
            input_type: Some(definition.input_type.clone()),
            label: definition.label.clone(),
            help: definition.help.clone(),
            placeholder: definition.placeholder.clone(),
            options,
            status: Some(SettingStatus::New),
            created_by: None,
            created_date: None,
            updated_by: None,
            updated_date: None,
        }
    }

    fn absorb(&mut self, saved: &Setting) {
        self.id = Some(saved.id);
        self.setting_value = saved.setting_value.clone();
        self.created_by = saved.created_by;
        self.created_date = saved.created_date;
        self.updated_by = saved.updated_by;
        self.updated_date = saved.updated_date;
        self.status = Some(SettingStatus::Merged);
    }

    /// A saved row as it stands, with an optional status.
    pub fn from_saved(saved: &Setting, status: Option<SettingStatus>) -> Self {
        Self {
            id: Some(saved.id),
            category: Some(saved.category.clone()),
            setting_key: saved.setting_key.clone(),
            setting_value: saved.setting_value.clone(),
            input_type: None,
            label: None,
            help: None,
            placeholder: None,
            options: IndexMap::new(),
            status,
            created_by: saved.created_by,
            created_date: saved.created_date,
            updated_by: saved.updated_by,
            updated_date: saved.updated_date,
        }
    }
}

/// Reconcile `saved` rows with `defined` settings.
///
/// With `category` set, declarations of any other category are dropped. Orphans are not
/// filtered by category. When several saved rows share a key the last one is merged and
/// the earlier ones are reported as orphans.
pub fn merge(
    saved: &[Setting],
    defined: &[SettingDefinition],
    category: Option<&str>,
) -> Vec<MergedSetting> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(saved.len());
    for (i, row) in saved.iter().enumerate() {
        index.insert(row.setting_key.as_str(), i);
    }

    let mut consumed = vec![false; saved.len()];
    let mut merged = Vec::with_capacity(defined.len() + saved.len());

    for definition in defined {
        if let Some(filter) = category {
            if definition.category.as_deref() != Some(filter) {
                continue;
            }
        }

        let mut setting = MergedSetting::from_definition(definition);
        if let Some(&i) = index.get(definition.key.as_str()) {
            if !consumed[i] {
                setting.absorb(&saved[i]);
                consumed[i] = true;
            }
        }
        merged.push(setting);
    }

    let orphans = saved
        .iter()
        .zip(consumed)
        .filter(|(_, used)| !used)
        .map(|(row, _)| MergedSetting::from_saved(row, Some(SettingStatus::Orphaned)));
    merged.extend(orphans);

    merged
}

/// Merge when a definition is available, otherwise show the saved rows unchanged.
pub fn merge_or_passthrough(
    saved: &[Setting],
    defined: Option<&[SettingDefinition]>,
    category: Option<&str>,
) -> Vec<MergedSetting> {
    match defined {
        Some(defined) => merge(saved, defined, category),
        None => saved
            .iter()
            .map(|row| MergedSetting::from_saved(row, None))
            .collect(),
    }
}

/// `settings[key]` lookup for the public renderer. Later rows win on duplicate keys.
pub fn value_map<'a, I>(rows: I) -> IndexMap<String, Option<String>>
where
    I: IntoIterator<Item = &'a Setting>,
{
    rows.into_iter()
        .map(|row| (row.setting_key.clone(), row.setting_value.clone()))
        .collect()
}
