//! Gallery image list

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Image source identifier: a remote URL or a path relative to the assets directory.
///
/// Doubles as the decode cache key, so two records with the same source share
/// one decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

/// Where the bytes of an [`ImageSource`] come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind<'a> {
    Remote(&'a str),
    Asset(&'a Path),
}

impl ImageSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn kind(&self) -> SourceKind<'_> {
        if self.0.starts_with("http://") || self.0.starts_with("https://") {
            SourceKind::Remote(&self.0)
        } else {
            SourceKind::Asset(Path::new(&self.0))
        }
    }

    /// Resolve an asset source against the assets root. Remote sources yield `None`.
    pub fn asset_path(&self, assets_dir: &Path) -> Option<PathBuf> {
        match self.kind() {
            SourceKind::Remote(_) => None,
            SourceKind::Asset(path) if path.is_absolute() => Some(path.to_path_buf()),
            SourceKind::Asset(path) => Some(assets_dir.join(path)),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageSource {
    fn from(src: &str) -> Self {
        Self::new(src)
    }
}

/// One gallery entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u32,
    pub src: ImageSource,
    pub alt: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ImageRecord {
    pub fn new(id: u32, src: &str, alt: &str, tags: &[&str]) -> Self {
        Self {
            id,
            src: ImageSource::new(src),
            alt: alt.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// On-disk catalog layout: a list of `[[image]]` tables
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(rename = "image", default)]
    images: Vec<ImageRecord>,
}

/// Ordered, immutable image list. Order defines the navigation sequence.
#[derive(Debug, Clone)]
pub struct Catalog {
    images: Arc<[ImageRecord]>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and duplicate ids
    pub fn new(images: Vec<ImageRecord>) -> Result<Self, AppError> {
        if images.is_empty() {
            return Err(AppError::Catalog("no images".into()));
        }

        let mut seen = HashSet::with_capacity(images.len());
        for record in &images {
            if !seen.insert(record.id) {
                return Err(AppError::Catalog(format!("duplicate id {}", record.id)));
            }
            if record.src.is_empty() {
                return Err(AppError::Catalog(format!("image {} has an empty src", record.id)));
            }
        }

        Ok(Self {
            images: images.into(),
        })
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content)
            .map_err(|e| AppError::Catalog(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::new(file.images)?;
        tracing::info!("Loaded {} images from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// The image list shipped with the application
    pub fn builtin() -> Self {
        let images = vec![
            ImageRecord::new(
                1,
                "https://images.unsplash.com/photo-1518770660439-4636190af475?q=80&w=1200&auto=format&fit=crop",
                "Mobile app UI mockups",
                &["mobile", "ui"],
            ),
            ImageRecord::new(
                2,
                "https://images.unsplash.com/photo-1555066931-4365d14bab8c?q=80&w=1200&auto=format&fit=crop",
                "Web dashboard analytics",
                &["web", "dashboard"],
            ),
            ImageRecord::new(
                3,
                "images/about-thumb.png",
                "About thumbnail image",
                &["about", "thumbnail"],
            ),
            ImageRecord::new(
                4,
                "https://images.unsplash.com/photo-1522071820081-009f0129c71c?q=80&w=1200&auto=format&fit=crop",
                "Team collaboration",
                &["team", "collab"],
            ),
            ImageRecord::new(
                5,
                "https://images.unsplash.com/photo-1498050108023-c5249f4df085?q=80&w=1200&auto=format&fit=crop",
                "Developer workspace",
                &["workspace"],
            ),
            ImageRecord::new(
                6,
                "https://images.unsplash.com/photo-1519389950473-47ba0277781c?q=80&w=1200&auto=format&fit=crop",
                "Product planning",
                &["planning"],
            ),
            ImageRecord::new(
                7,
                "images/process-thumb.jpg",
                "Process workflow",
                &["process", "workflow"],
            ),
            ImageRecord::new(
                8,
                "images/project-2.jpg",
                "Project showcase",
                &["project", "showcase"],
            ),
            ImageRecord::new(
                9,
                "images/skill-thumb.png",
                "Skills and expertise",
                &["skills", "expertise"],
            ),
        ];

        Self {
            images: images.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.images.iter()
    }

    pub fn sources(&self) -> impl Iterator<Item = &ImageSource> {
        self.images.iter().map(|record| &record.src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.get(2).unwrap().alt, "About thumbnail image");
        // Rebuilding through the validating constructor must succeed
        assert!(Catalog::new(catalog.iter().cloned().collect()).is_ok());
    }

    #[test]
    fn test_source_kind() {
        let remote = ImageSource::new("https://example.com/a.jpg");
        assert_eq!(remote.kind(), SourceKind::Remote("https://example.com/a.jpg"));
        assert_eq!(remote.asset_path(Path::new("assets")), None);

        let asset = ImageSource::new("images/project-2.jpg");
        assert_eq!(
            asset.asset_path(Path::new("assets")),
            Some(PathBuf::from("assets/images/project-2.jpg"))
        );

        assert!(ImageSource::new("  ").is_empty());
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(Catalog::new(Vec::new()), Err(AppError::Catalog(_))));

        let dup = vec![
            ImageRecord::new(1, "a.png", "A", &[]),
            ImageRecord::new(1, "b.png", "B", &[]),
        ];
        assert!(matches!(Catalog::new(dup), Err(AppError::Catalog(_))));

        let blank = vec![ImageRecord::new(1, "", "A", &[])];
        assert!(matches!(Catalog::new(blank), Err(AppError::Catalog(_))));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.toml");
        std::fs::write(
            &path,
            r#"
[[image]]
id = 10
src = "images/one.png"
alt = "One"
tags = ["first"]

[[image]]
id = 11
src = "https://example.com/two.jpg"
alt = "Two"
"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().tags, vec!["first".to_string()]);
        assert!(catalog.get(1).unwrap().tags.is_empty());
        assert_eq!(catalog.get(1).unwrap().src.as_str(), "https://example.com/two.jpg");
    }
}
