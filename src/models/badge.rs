use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The version every badge family is expected to carry.
pub const FALLBACK_BADGE_KIND: &str = "1";

/// A `name/kind` pair from the `badges` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadgeRef {
    pub name: String,
    pub kind: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BadgeVersion {
    pub image_url_1x: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BadgeSet {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub versions: HashMap<String, BadgeVersion>,
}

/// A badge after catalog lookup, ready to have its icon loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedBadge {
    pub badge: BadgeRef,
    pub description: String,
    pub image_url: String,
}

/// Badge family name to the icons known for it. Loaded once per session.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BadgeCatalog {
    sets: HashMap<String, BadgeSet>,
}

/// The `{"badge_sets": {...}}` document shape used by catalog files.
#[derive(Debug, Deserialize)]
pub struct BadgeCatalogFile {
    pub badge_sets: BadgeCatalog,
}

impl BadgeCatalog {
    pub fn new(sets: HashMap<String, BadgeSet>) -> Self {
        Self { sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Overlays `other` on top of `self`; families present in both are
    /// replaced wholesale by `other`'s.
    pub fn merge(&mut self, other: BadgeCatalog) {
        self.sets.extend(other.sets);
    }

    /// Looks a badge up, rewriting an unknown kind to the fallback version.
    /// Returns `None` for families the catalog does not know, or when not
    /// even the fallback version exists.
    pub fn resolve(&self, badge: &BadgeRef) -> Option<ResolvedBadge> {
        let set = self.sets.get(&badge.name)?;

        let kind = if set.versions.contains_key(&badge.kind) {
            badge.kind.clone()
        } else {
            FALLBACK_BADGE_KIND.to_string()
        };
        let version = set.versions.get(&kind)?;

        let description = if set.description.is_empty() {
            version.title.clone()
        } else {
            set.description.clone()
        };

        Some(ResolvedBadge {
            badge: BadgeRef {
                name: badge.name.clone(),
                kind,
            },
            description,
            image_url: version.image_url_1x.clone(),
        })
    }
}
