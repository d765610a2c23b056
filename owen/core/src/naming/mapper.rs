//! Name Mapper
//!
//! Converts animation names between the four naming schemes.
//!
//! # Design Philosophy
//!
//! - **Built once**: all `scheme × scheme` lookup tables are computed at
//!   construction from the catalog; afterwards the mapper is immutable and
//!   shared by `Arc`.
//! - **Precedence**: a name present in more than one scheme is detected as
//!   the first scheme in canonical order (legacy, artist, hierarchical,
//!   semantic).
//! - **No panics**: unknown names surface as [`MapperError`] values.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{self, IDENTITY_COUNT};
use super::{AnimationNames, Scheme};
use crate::clip::metadata::ClipMetadata;
use crate::emotion::Emotion;
use crate::states::CharacterState;

/// Maximum number of suggestions returned for an invalid name
const MAX_SUGGESTIONS: usize = 3;

// ============================================================================
// Error Types
// ============================================================================

/// Name mapping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// Name does not belong to any scheme
    #[error("Animation name '{name}' does not match any naming scheme")]
    SchemeNotFound {
        /// Name that was looked up
        name: String,
    },

    /// Name is not in the conversion table for the scheme pair
    #[error("Animation '{name}' not found converting {source_scheme} -> {target_scheme}")]
    AnimationNotFound {
        /// Name that was looked up
        name: String,
        /// Scheme the name was read as
        source_scheme: Scheme,
        /// Requested output scheme
        target_scheme: Scheme,
    },

    /// Scheme identifier did not parse
    #[error("Unknown naming scheme '{0}'")]
    UnknownScheme(String),
}

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of [`NameMapper::validate_animation_name`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the name is a known catalog name
    pub is_valid: bool,
    /// Scheme the name belongs to, if valid
    pub detected_scheme: Option<Scheme>,
    /// Similar known names (only for invalid input)
    pub suggestions: Vec<String>,
    /// Human-readable problems found
    pub errors: Vec<String>,
}

/// Filter for [`NameMapper::animations_by_filter`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFilter {
    /// Owning character state
    pub state: CharacterState,
    /// Emotion to match; `None` matches any
    pub emotion: Option<Emotion>,
}

impl AnimationFilter {
    /// Match every animation of a state
    #[must_use]
    pub const fn state(state: CharacterState) -> Self {
        Self {
            state,
            emotion: None,
        }
    }

    /// Also require an emotion
    #[must_use]
    pub const fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }
}

/// One entry of a batch conversion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConversion {
    /// Input name
    pub input: String,
    /// Converted name or the reason it failed
    pub result: Result<String, MapperError>,
}

/// Kind of naming conflict
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Same name appears twice in one scheme
    DuplicateWithinScheme,
    /// Same name is claimed by several schemes
    CrossScheme,
}

/// A name that is ambiguous in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConflict {
    /// Conflicting name
    pub name: String,
    /// What kind of conflict
    pub kind: ConflictKind,
    /// Schemes involved
    pub schemes: Vec<Scheme>,
}

// ============================================================================
// Mapper
// ============================================================================

type Table = HashMap<&'static str, &'static str>;

/// Bidirectional animation name converter
#[derive(Debug, Clone)]
pub struct NameMapper {
    /// `tables[source][target][name]`
    tables: [[Table; 4]; 4],
    /// Catalog position of each name, per scheme
    index: [HashMap<&'static str, usize>; 4],
    /// Every distinct name, catalog order, schemes in canonical order
    universe: Vec<&'static str>,
}

impl NameMapper {
    /// Build all conversion tables from the catalog
    #[must_use]
    pub fn new() -> Self {
        let tables = std::array::from_fn(|s| {
            let source = catalog::names(Scheme::ALL[s]);
            std::array::from_fn(|t| {
                let target = catalog::names(Scheme::ALL[t]);
                source.iter().copied().zip(target.iter().copied()).collect()
            })
        });

        let index = std::array::from_fn(|s| {
            catalog::names(Scheme::ALL[s])
                .iter()
                .enumerate()
                .map(|(i, name)| (*name, i))
                .collect()
        });

        let mut seen = HashSet::new();
        let universe = Scheme::ALL
            .into_iter()
            .flat_map(catalog::names)
            .copied()
            .filter(|name| seen.insert(*name))
            .collect();

        tracing::debug!(identities = IDENTITY_COUNT, "Name mapper initialized");

        Self {
            tables,
            index,
            universe,
        }
    }

    /// First scheme in canonical order whose list contains `name` exactly
    #[must_use]
    pub fn detect_scheme(&self, name: &str) -> Option<Scheme> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| self.index[scheme.index()].contains_key(name))
    }

    /// Convert `name` into the `target` scheme.
    ///
    /// When `source` is `None` the scheme is detected first.
    pub fn convert(
        &self,
        name: &str,
        target: Scheme,
        source: Option<Scheme>,
    ) -> Result<String, MapperError> {
        let source = match source {
            Some(scheme) => scheme,
            None => self
                .detect_scheme(name)
                .ok_or_else(|| MapperError::SchemeNotFound {
                    name: name.to_string(),
                })?,
        };

        self.tables[source.index()][target.index()]
            .get(name)
            .map(|mapped| (*mapped).to_string())
            .ok_or_else(|| MapperError::AnimationNotFound {
                name: name.to_string(),
                source_scheme: source,
                target_scheme: target,
            })
    }

    /// All four spellings of a known name
    pub fn all_names(&self, name: &str) -> Result<AnimationNames, MapperError> {
        self.detect_scheme(name)
            .and_then(|scheme| self.index[scheme.index()].get(name).copied())
            .and_then(catalog::identity)
            .ok_or_else(|| MapperError::SchemeNotFound {
                name: name.to_string(),
            })
    }

    /// Check a name and suggest close matches when it is unknown
    #[must_use]
    pub fn validate_animation_name(&self, name: &str) -> ValidationResult {
        if name.is_empty() {
            return ValidationResult {
                errors: vec!["Animation name must not be empty".to_string()],
                ..ValidationResult::default()
            };
        }

        if let Some(scheme) = self.detect_scheme(name) {
            return ValidationResult {
                is_valid: true,
                detected_scheme: Some(scheme),
                ..ValidationResult::default()
            };
        }

        ValidationResult {
            is_valid: false,
            detected_scheme: None,
            suggestions: self.suggestions(name),
            errors: vec![format!(
                "Animation '{name}' does not match any known naming scheme"
            )],
        }
    }

    /// Every name of a scheme, catalog order
    #[must_use]
    pub fn all_animations_by_scheme(&self, scheme: Scheme) -> Vec<String> {
        catalog::names(scheme)
            .iter()
            .map(|n| (*n).to_string())
            .collect()
    }

    /// Identities whose legacy metadata matches the filter
    #[must_use]
    pub fn animations_by_filter(&self, filter: &AnimationFilter) -> Vec<AnimationNames> {
        catalog::names(Scheme::Legacy)
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                ClipMetadata::parse(name).is_ok_and(|meta| {
                    meta.character_state() == Some(filter.state)
                        && filter.emotion.map_or(true, |e| meta.emotion == e)
                })
            })
            .filter_map(|(i, _)| catalog::identity(i))
            .collect()
    }

    /// Convert each name independently, keeping per-name outcomes
    #[must_use]
    pub fn convert_batch<S: AsRef<str>>(&self, names: &[S], target: Scheme) -> Vec<BatchConversion> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let result = self.convert(name, target, None);
                if let Err(e) = &result {
                    tracing::debug!(name, error = %e, "Batch conversion failed");
                }
                BatchConversion {
                    input: name.to_string(),
                    result,
                }
            })
            .collect()
    }

    /// Names that are duplicated within a scheme or claimed by several
    #[must_use]
    pub fn naming_conflicts(&self) -> Vec<NamingConflict> {
        let mut conflicts = Vec::new();
        let mut owners: HashMap<&str, Vec<Scheme>> = HashMap::new();

        for scheme in Scheme::ALL {
            let mut seen = HashSet::new();
            for name in catalog::names(scheme) {
                if !seen.insert(*name) {
                    conflicts.push(NamingConflict {
                        name: (*name).to_string(),
                        kind: ConflictKind::DuplicateWithinScheme,
                        schemes: vec![scheme],
                    });
                }
                let entry = owners.entry(*name).or_default();
                if !entry.contains(&scheme) {
                    entry.push(scheme);
                }
            }
        }

        for name in &self.universe {
            if let Some(schemes) = owners.get(name) {
                if schemes.len() > 1 {
                    conflicts.push(NamingConflict {
                        name: (*name).to_string(),
                        kind: ConflictKind::CrossScheme,
                        schemes: schemes.clone(),
                    });
                }
            }
        }

        conflicts
    }

    fn suggestions(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        self.universe
            .iter()
            .filter(|candidate| {
                let candidate = candidate.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
            .take(MAX_SUGGESTIONS)
            .map(|s| (*s).to_string())
            .collect()
    }
}

impl Default for NameMapper {
    fn default() -> Self {
        Self::new()
    }
}
