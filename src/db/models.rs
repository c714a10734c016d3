//! Database Models - rows returned by the mappers.
//!
//! Columns keep their snake_case names for `sqlx::FromRow`; serde exposes the camelCase
//! names the renderer reads (`pageSlug`, `blockKey`, `settingValue`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::content::media::Media;

/// Setting categories stored in `data_store.category`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Page,
    Element,
    Site,
    Contact,
    Social,
    /// Internal application values such as the app alert slot
    Piton,
}

impl SettingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingCategory::Page => "page",
            SettingCategory::Element => "element",
            SettingCategory::Site => "site",
            SettingCategory::Contact => "contact",
            SettingCategory::Social => "social",
            SettingCategory::Piton => "piton",
        }
    }

    /// Categories managed on the site settings screen. `piton` holds internal
    /// values and is never editable.
    pub fn site_categories() -> [SettingCategory; 3] {
        [SettingCategory::Site, SettingCategory::Contact, SettingCategory::Social]
    }
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(SettingCategory::Page),
            "element" => Ok(SettingCategory::Element),
            "site" => Ok(SettingCategory::Site),
            "contact" => Ok(SettingCategory::Contact),
            "social" => Ok(SettingCategory::Social),
            "piton" => Ok(SettingCategory::Piton),
            other => Err(format!("unknown setting category '{}'", other)),
        }
    }
}

/// Persisted key/value setting (`data_store`)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub category: String,
    pub page_id: Option<i64>,
    pub element_id: Option<i64>,
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub created_by: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_by: Option<i64>,
    pub updated_date: Option<DateTime<Utc>>,
}

/// Draft-date derived state of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishedStatus {
    Draft,
    Pending,
    Published,
}

impl PublishedStatus {
    pub fn of(published_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match published_date {
            None => PublishedStatus::Draft,
            Some(date) if date > today => PublishedStatus::Pending,
            Some(_) => PublishedStatus::Published,
        }
    }
}

/// Page row joined with its collection and media
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub collection_id: Option<i64>,
    pub collection_slug: Option<String>,
    pub collection_title: Option<String>,
    pub page_slug: String,
    pub template: String,
    pub title: String,
    pub sub_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub media_id: Option<i64>,
    #[serde(skip)]
    pub media_filename: Option<String>,
    #[serde(skip)]
    pub media_width: Option<i32>,
    #[serde(skip)]
    pub media_height: Option<i32>,
    #[serde(skip)]
    pub media_feature: Option<bool>,
    #[serde(skip)]
    pub media_caption: Option<String>,
    #[sqlx(skip)]
    pub media: Option<Media>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl Page {
    /// Move the joined `media_*` columns into the `media` sub-object.
    pub fn with_media(mut self) -> Self {
        self.media = Media::from_joined(
            self.media_id,
            self.media_filename.take(),
            self.media_width.take(),
            self.media_height.take(),
            self.media_feature.take(),
            self.media_caption.take(),
        );
        self
    }

    pub fn published_status(&self, today: NaiveDate) -> PublishedStatus {
        PublishedStatus::of(self.published_date, today)
    }
}

/// Block element row joined with its media
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: i64,
    pub page_id: i64,
    pub block_key: String,
    pub template: String,
    pub element_sort: i32,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub collection_id: Option<i64>,
    pub gallery_id: Option<i64>,
    pub embedded: Option<String>,
    pub media_id: Option<i64>,
    #[serde(skip)]
    pub media_filename: Option<String>,
    #[serde(skip)]
    pub media_width: Option<i32>,
    #[serde(skip)]
    pub media_height: Option<i32>,
    #[serde(skip)]
    pub media_feature: Option<bool>,
    #[serde(skip)]
    pub media_caption: Option<String>,
    #[sqlx(skip)]
    pub media: Option<Media>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl Element {
    pub fn with_media(mut self) -> Self {
        self.media = Media::from_joined(
            self.media_id,
            self.media_filename.take(),
            self.media_width.take(),
            self.media_height.take(),
            self.media_feature.take(),
            self.media_caption.take(),
        );
        self
    }
}

/// One navigation entry with its page / collection columns resolved by join.
/// Collection entries arrive pre-expanded, one row per collection detail page.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRow {
    pub navigator: String,
    pub id: i64,
    pub parent_id: Option<i64>,
    pub sort: i32,
    pub nav_title: Option<String>,
    pub url: Option<String>,
    pub collection_id: Option<i64>,
    pub collection_title: Option<String>,
    pub collection_slug: Option<String>,
    pub page_id: Option<i64>,
    pub page_title: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub page_slug: Option<String>,
}

/// Collection with its number of assigned pages
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub collection_slug: String,
    pub collection_title: String,
    pub collection_definition: String,
    pub page_count: i64,
}

/// Media library row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: i64,
    pub filename: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub feature: bool,
    pub caption: Option<String>,
    pub mime_type: Option<String>,
    /// new | complete | retry | exclude
    pub optimized: String,
    pub created_date: Option<DateTime<Utc>>,
}

impl MediaRecord {
    pub fn to_media(&self) -> Media {
        Media::new(
            self.id,
            self.filename.clone(),
            self.width,
            self.height,
            self.feature,
            self.caption.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_published_status_boundaries() {
        let today = day(2024, 5, 10);
        assert_eq!(PublishedStatus::of(None, today), PublishedStatus::Draft);
        assert_eq!(
            PublishedStatus::of(Some(day(2024, 5, 11)), today),
            PublishedStatus::Pending
        );
        assert_eq!(
            PublishedStatus::of(Some(today), today),
            PublishedStatus::Published
        );
    }

    #[test]
    fn test_setting_category_round_trip_names() {
        for category in SettingCategory::site_categories() {
            let parsed: SettingCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("bogus".parse::<SettingCategory>().is_err());
        assert!(!SettingCategory::site_categories().contains(&SettingCategory::Piton));
    }

    #[test]
    fn test_setting_serializes_camel_case() {
        let setting = Setting {
            id: 1,
            category: "page".into(),
            page_id: Some(2),
            element_id: None,
            setting_key: "heroColor".into(),
            setting_value: Some("blue".into()),
            created_by: None,
            created_date: None,
            updated_by: None,
            updated_date: None,
        };
        let json = serde_json::to_value(&setting).unwrap();
        assert_eq!(json["settingKey"], "heroColor");
        assert_eq!(json["settingValue"], "blue");
        assert_eq!(json["pageId"], 2);
    }
}
