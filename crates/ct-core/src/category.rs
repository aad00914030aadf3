//! Color-tag categorization.
//!
//! A [`CategoryTable`] maps color tags to category names. The absent tag is
//! its own key. Tags missing from the table fall into [`UNCATEGORIZED`].
//! [`CHORES_AND_MISC`] is produced by daily gap-filling and is not expected as
//! a configured category, although nothing here forbids it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Category for color tags the table does not know.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category holding the unaccounted time of a day.
pub const CHORES_AND_MISC: &str = "Chores & Misc";

/// Mapping from color tag to category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Color tag to category.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,

    /// Category for events without a color tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untagged: Option<String>,
}

impl CategoryTable {
    /// Looks up a tag. `None` is the untagged key, not the string `"null"`.
    pub fn lookup(&self, color: Option<&str>) -> Option<&str> {
        match color {
            Some(color) => self.colors.get(color).map(String::as_str),
            None => self.untagged.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.untagged.is_none()
    }

    /// All category names the table can produce.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.colors
            .values()
            .map(String::as_str)
            .chain(self.untagged.as_deref())
            .collect()
    }
}

/// Category names counted as deep work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeepWorkSet(BTreeSet<String>);

impl DeepWorkSet {
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeepWorkSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Categorization configuration, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(flatten)]
    pub table: CategoryTable,
    #[serde(default)]
    pub deep_work: DeepWorkSet,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        let colors = [
            ("5", "Personal Development"),
            ("10", "Work"),
            ("7", "Personal Projects"),
            ("11", "Wasted Time"),
        ]
        .into_iter()
        .map(|(color, category)| (color.to_string(), category.to_string()))
        .collect();

        Self {
            table: CategoryTable {
                colors,
                untagged: Some(CHORES_AND_MISC.to_string()),
            },
            deep_work: ["Work", "Personal Projects"].into_iter().collect(),
        }
    }
}

impl CategoryConfig {
    /// Checks the table for configuration errors.
    ///
    /// Deep-work names that no mapping produces are only warned about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        for (color, category) in &self.table.colors {
            if color.trim().is_empty() {
                return Err(ConfigError::BlankColor);
            }
            if category.trim().is_empty() {
                return Err(ConfigError::BlankCategory {
                    color: color.clone(),
                });
            }
        }
        if self
            .table
            .untagged
            .as_deref()
            .is_some_and(|category| category.trim().is_empty())
        {
            return Err(ConfigError::BlankCategory {
                color: "(untagged)".to_string(),
            });
        }

        let known = self.table.categories();
        for name in self.deep_work.iter() {
            if !known.contains(name) && name != UNCATEGORIZED {
                tracing::warn!(category = name, "deep work category is not mapped by any color");
            }
        }
        Ok(())
    }

    pub const fn categorizer(&self) -> Categorizer<'_> {
        Categorizer { config: self }
    }
}

/// Maps color tags to categories. Total over every tag value.
#[derive(Debug, Clone, Copy)]
pub struct Categorizer<'a> {
    config: &'a CategoryConfig,
}

impl<'a> Categorizer<'a> {
    pub fn categorize(&self, color: Option<&str>) -> &'a str {
        self.config.table.lookup(color).unwrap_or(UNCATEGORIZED)
    }

    pub fn is_deep_work(&self, category: &str) -> bool {
        self.config.deep_work.contains(category)
    }
}
