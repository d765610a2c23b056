//! Emotions and message classification
//!
//! Owen reacts to what the user types. A message is scanned for keywords in
//! a fixed priority order and the first matching group wins:
//!
//! ```text
//!   urgent asap hurry              -> angry
//!   error problem issue bug broken -> shocked
//!   great awesome good excellent   -> happy
//!   perfect
//!   sad disappointed failed wrong  -> sad
//!   "!" with no keyword            -> angry
//!   (nothing)                      -> neutral
//! ```
//!
//! A bare exclamation mark only tips the balance when no keyword matched,
//! so "Great work!" is happy while "Do it now!" is angry. An alarmed
//! "Error!" stays shocked for the same reason.
//!
//! Matching is plain lower-case substring containment, so "goodbye" counts
//! as happy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Emotional tint of a clip or state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// No emotion; clips carry no emotion suffix
    #[default]
    Neutral,
    /// Urgency or frustration
    Angry,
    /// Surprise at errors and problems
    Shocked,
    /// Praise and good news
    Happy,
    /// Disappointment
    Sad,
}

/// Keyword groups in priority order
const KEYWORDS: [(Emotion, &[&str]); 4] = [
    (Emotion::Angry, &["urgent", "asap", "hurry"]),
    (
        Emotion::Shocked,
        &["error", "problem", "issue", "bug", "broken"],
    ),
    (
        Emotion::Happy,
        &["great", "awesome", "good", "excellent", "perfect"],
    ),
    (Emotion::Sad, &["sad", "disappointed", "failed", "wrong"]),
];

impl Emotion {
    /// Full lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Angry => "angry",
            Self::Shocked => "shocked",
            Self::Happy => "happy",
            Self::Sad => "sad",
        }
    }

    /// Suffix used when building clip names; `None` for neutral
    #[must_use]
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Neutral => None,
            other => Some(other.as_str()),
        }
    }

    /// Two-letter code the catalog uses in transition names such as
    /// `react_hp2type_T`; `None` for neutral
    #[must_use]
    pub const fn catalog_code(self) -> Option<&'static str> {
        match self {
            Self::Neutral => None,
            Self::Angry => Some("an"),
            Self::Shocked => Some("sh"),
            Self::Happy => Some("hp"),
            Self::Sad => Some("sd"),
        }
    }

    /// Whether this is the default, unsuffixed emotion
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral)
    }

    /// Parse an emotion tag as it appears in clip names.
    ///
    /// Accepts the full word as well as the short codes used by the
    /// catalog (`an`, `sh`, `ha`/`hp`, `sa`/`sd`).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "neutral" => Some(Self::Neutral),
            "angry" | "an" => Some(Self::Angry),
            "shocked" | "sh" => Some(Self::Shocked),
            "happy" | "ha" | "hp" => Some(Self::Happy),
            "sad" | "sa" | "sd" => Some(Self::Sad),
            _ => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a user message into an emotion
#[must_use]
pub fn classify_message(message: &str) -> Emotion {
    let lower = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(emotion, _)| *emotion)
        .unwrap_or(if lower.contains('!') {
            Emotion::Angry
        } else {
            Emotion::Neutral
        })
}
