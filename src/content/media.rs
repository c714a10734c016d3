//! Media sub-objects attached to pages and elements, and media file naming.

use serde::{Deserialize, Serialize};

/// Size suffixes produced by the optimisation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSize {
    Original,
    Xlarge,
    Large,
    Small,
    Thumb,
}

impl MediaSize {
    fn suffix(self) -> Option<&'static str> {
        match self {
            MediaSize::Original => None,
            MediaSize::Xlarge => Some("xlarge"),
            MediaSize::Large => Some("large"),
            MediaSize::Small => Some("small"),
            MediaSize::Thumb => Some("thumb"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    pub filename: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub feature: bool,
    pub caption: Option<String>,
    pub aspect_ratio: Option<f64>,
    pub orientation: Option<Orientation>,
    pub featured: bool,
}

impl Media {
    pub fn new(
        id: i64,
        filename: String,
        width: Option<i32>,
        height: Option<i32>,
        feature: bool,
        caption: Option<String>,
    ) -> Self {
        let aspect_ratio = match (width, height) {
            (Some(w), Some(h)) if h > 0 => Some((f64::from(w) / f64::from(h) * 100.0).round() / 100.0),
            _ => None,
        };
        let orientation = aspect_ratio.map(|ratio| {
            if ratio > 1.0 {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            }
        });

        Self {
            id,
            filename,
            width,
            height,
            feature,
            caption,
            aspect_ratio,
            orientation,
            featured: feature,
        }
    }

    /// Build the sub-object from `media_*` columns of a left join; absent when the
    /// join found no file.
    pub fn from_joined(
        id: Option<i64>,
        filename: Option<String>,
        width: Option<i32>,
        height: Option<i32>,
        feature: Option<bool>,
        caption: Option<String>,
    ) -> Option<Self> {
        match (id, filename) {
            (Some(id), Some(filename)) => Some(Self::new(
                id,
                filename,
                width,
                height,
                feature.unwrap_or(false),
                caption,
            )),
            _ => None,
        }
    }

    pub fn url(&self, size: MediaSize) -> String {
        media_url(&self.filename, size)
    }
}

/// Directory holding every size of `filename`: `/media/{first two}/{stem}/`
pub fn media_directory(filename: &str) -> String {
    let (stem, _) = split_extension(filename);
    let prefix: String = stem.chars().take(2).collect();

    format!("/media/{}/{}/", prefix, stem)
}

/// File name of a size variant, `name-thumb.jpg` for `name.jpg`
pub fn sized_filename(filename: &str, size: MediaSize) -> String {
    match size.suffix() {
        None => filename.to_string(),
        Some(suffix) => match split_extension(filename) {
            (stem, Some(ext)) => format!("{}-{}.{}", stem, suffix, ext),
            (stem, None) => format!("{}-{}", stem, suffix),
        },
    }
}

pub fn media_url(filename: &str, size: MediaSize) -> String {
    if filename.to_ascii_lowercase().starts_with("http") {
        return filename.to_string();
    }

    format!("{}{}", media_directory(filename), sized_filename(filename, size))
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_ratio_is_rounded() {
        let media = Media::new(1, "a1b2c3.jpg".into(), Some(1600), Some(900), true, None);
        assert_eq!(media.aspect_ratio, Some(1.78));
        assert_eq!(media.orientation, Some(Orientation::Landscape));
        assert!(media.featured);
    }

    #[test]
    fn test_square_image_is_portrait() {
        let media = Media::new(1, "sq.png".into(), Some(500), Some(500), false, None);
        assert_eq!(media.aspect_ratio, Some(1.0));
        assert_eq!(media.orientation, Some(Orientation::Portrait));
    }

    #[test]
    fn test_zero_height_has_no_ratio() {
        let media = Media::new(1, "x.png".into(), Some(500), Some(0), false, None);
        assert_eq!(media.aspect_ratio, None);
        assert_eq!(media.orientation, None);
    }

    #[test]
    fn test_from_joined_requires_filename() {
        assert!(Media::from_joined(Some(3), None, None, None, None, None).is_none());
        assert!(Media::from_joined(Some(3), Some("f.jpg".into()), None, None, None, None).is_some());
    }

    #[test]
    fn test_size_variant_paths() {
        assert_eq!(sized_filename("a1b2c3.jpg", MediaSize::Thumb), "a1b2c3-thumb.jpg");
        assert_eq!(sized_filename("a1b2c3.jpg", MediaSize::Original), "a1b2c3.jpg");
        assert_eq!(
            media_url("a1b2c3.jpg", MediaSize::Large),
            "/media/a1/a1b2c3/a1b2c3-large.jpg"
        );
        assert_eq!(
            media_url("https://cdn.example.com/x.jpg", MediaSize::Thumb),
            "https://cdn.example.com/x.jpg"
        );
    }
}
