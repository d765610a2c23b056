//! Animation Naming Schemes
//!
//! Every logical animation Owen can play is known under four spellings:
//!
//! | Scheme         | Example                      | Used by                    |
//! |----------------|------------------------------|----------------------------|
//! | `legacy`       | `wait_idle_L`                | original state handlers    |
//! | `artist`       | `Owen_WaitIdle`              | Blender export workflow    |
//! | `hierarchical` | `owen.state.wait.idle.loop`  | asset organization         |
//! | `semantic`     | `OwenWaitIdleLoop`           | readable code references   |
//!
//! The [`catalog`] holds the canonical per-scheme tables and the [`mapper`]
//! converts between them.

pub mod catalog;
pub mod mapper;

pub use catalog::{identity, names, IDENTITY_COUNT};
pub use mapper::{
    AnimationFilter, BatchConversion, ConflictKind, MapperError, NameMapper, NamingConflict,
    ValidationResult,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four animation naming conventions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// `state_action_TYPE` names used by the state handlers
    Legacy,
    /// `Owen_PascalCase` names produced by artists
    Artist,
    /// Dot-separated `owen.category.state.action` names
    Hierarchical,
    /// `OwenPascalCase` names with a kind suffix
    Semantic,
}

impl Scheme {
    /// All schemes in canonical precedence order
    pub const ALL: [Scheme; 4] = [
        Scheme::Legacy,
        Scheme::Artist,
        Scheme::Hierarchical,
        Scheme::Semantic,
    ];

    /// Position of this scheme in [`Scheme::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case scheme name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Artist => "artist",
            Self::Hierarchical => "hierarchical",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MapperError::UnknownScheme(s.to_string()))
    }
}

/// The four spellings of one logical animation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationNames {
    /// Legacy spelling
    pub legacy: String,
    /// Artist spelling
    pub artist: String,
    /// Hierarchical spelling
    pub hierarchical: String,
    /// Semantic spelling
    pub semantic: String,
}

impl AnimationNames {
    /// Name under the given scheme
    #[must_use]
    pub fn get(&self, scheme: Scheme) -> &str {
        match scheme {
            Scheme::Legacy => &self.legacy,
            Scheme::Artist => &self.artist,
            Scheme::Hierarchical => &self.hierarchical,
            Scheme::Semantic => &self.semantic,
        }
    }

    /// Iterate `(scheme, name)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Scheme, &str)> + '_ {
        Scheme::ALL
            .into_iter()
            .map(move |scheme| (scheme, self.get(scheme)))
    }
}
