//! Patch targets and the configuration document that lists them.
//!
//! The document is a JSON object mapping category names to product names to
//! [`TargetConfig`] values, plus a `win_user` field holding the default user
//! identifier substituted into cache path templates:
//!
//! ```json
//! {
//!   "win_user": "alice",
//!   "JetBrains": {
//!     "IntelliJ IDEA": {
//!       "source": "lib/app.jar",
//!       "items": ["artwork/splash.png", "artwork/splash@2x.png"],
//!       "cache": ["C:/Users/%s/AppData/Local/JetBrains", "IntelliJIdea", "splash"]
//!     }
//!   }
//! }
//! ```
//!
//! The cache descriptor accepts both the compact three-element array shown
//! above and the object form with named fields.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder in [`CacheDescriptor::path_template`] replaced by the user identifier.
pub const USER_PLACEHOLDER: &str = "%s";

/// Default suffix of the host application's cache files.
pub const DEFAULT_CACHE_SUFFIX: &str = ".ij";

/// One patchable archive and the entries inside it that hold the splash image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Archive path relative to the installation root.
    pub source: String,
    /// Archive-internal entry paths, in patch order.
    #[serde(default)]
    pub items: Vec<String>,
    /// Where the host application caches renderings of the resource.
    #[serde(default)]
    pub cache: Option<CacheDescriptor>,
}

impl TargetConfig {
    /// Creates a target without a cache descriptor.
    pub fn new(
        source: impl Into<String>,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            source: source.into(),
            items: items.into_iter().map(Into::into).collect(),
            cache: None,
        }
    }

    /// Attaches a cache descriptor.
    pub fn with_cache(mut self, cache: CacheDescriptor) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the directory part of `source` (everything before the last `/`).
    ///
    /// Returns an empty string when `source` has no directory component.
    pub fn source_dir(&self) -> &str {
        match self.source.rfind('/') {
            Some(pos) => &self.source[..pos],
            None => "",
        }
    }
}

/// Which matching cache directories are invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSelection {
    /// Only the directory with the greatest version (or the bare prefix).
    #[default]
    Newest,
    /// Every directory matching the prefix.
    All,
}

/// Describes where a host application stores rendering caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CacheDescriptorRepr")]
pub struct CacheDescriptor {
    /// Base directory template containing [`USER_PLACEHOLDER`].
    pub path_template: String,
    /// Directory-name prefix of the version-qualified cache roots.
    pub prefix: String,
    /// Path below the selected cache root holding the cache files.
    pub sub_path: String,
    /// File-name suffix of the cache files to delete.
    pub file_suffix: String,
    /// Directory selection policy.
    pub selection: CacheSelection,
}

impl CacheDescriptor {
    /// Creates a descriptor with the default suffix and selection policy.
    pub fn new(
        path_template: impl Into<String>,
        prefix: impl Into<String>,
        sub_path: impl Into<String>,
    ) -> Self {
        Self {
            path_template: path_template.into(),
            prefix: prefix.into(),
            sub_path: sub_path.into(),
            file_suffix: DEFAULT_CACHE_SUFFIX.to_string(),
            selection: CacheSelection::default(),
        }
    }

    /// Sets the cache-file suffix.
    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    /// Sets the directory selection policy.
    pub fn selection(mut self, selection: CacheSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Substitutes the user identifier into the path template.
    pub fn base_dir(&self, user: &str) -> String {
        self.path_template.replace(USER_PLACEHOLDER, user)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CacheDescriptorRepr {
    Compact(String, String, String),
    Full {
        path_template: String,
        prefix: String,
        #[serde(default)]
        sub_path: String,
        #[serde(default = "default_suffix")]
        file_suffix: String,
        #[serde(default)]
        selection: CacheSelection,
    },
}

fn default_suffix() -> String {
    DEFAULT_CACHE_SUFFIX.to_string()
}

impl From<CacheDescriptorRepr> for CacheDescriptor {
    fn from(repr: CacheDescriptorRepr) -> Self {
        match repr {
            CacheDescriptorRepr::Compact(path_template, prefix, sub_path) => {
                CacheDescriptor::new(path_template, prefix, sub_path)
            }
            CacheDescriptorRepr::Full {
                path_template,
                prefix,
                sub_path,
                file_suffix,
                selection,
            } => CacheDescriptor {
                path_template,
                prefix,
                sub_path,
                file_suffix,
                selection,
            },
        }
    }
}

/// The configuration document: default user plus `category -> product -> target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Default user identifier for cache path substitution.
    #[serde(rename = "win_user")]
    pub default_user: String,
    /// Targets grouped by category, then product.
    #[serde(flatten)]
    pub categories: BTreeMap<String, BTreeMap<String, TargetConfig>>,
}

impl PatchConfig {
    /// Parses a configuration document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Returns the category names in sorted order.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Returns the product names of a category in sorted order.
    pub fn products(&self, category: &str) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|products| products.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Looks up the target for a category/product pair.
    pub fn target(&self, category: &str, product: &str) -> Result<&TargetConfig> {
        self.categories
            .get(category)
            .and_then(|products| products.get(product))
            .ok_or_else(|| Error::UnknownTarget {
                category: category.to_string(),
                product: product.to_string(),
            })
    }
}
