//! Clip name grammar
//!
//! Legacy clip names encode what the clip is for:
//!
//! ```text
//!   wait_idle_L                  state_action_TYPE
//!   react_angry2type_angry_T     state_action2to_emotion_T
//!   react_an2frown_T             emotion-tagged action
//!   type2wait_T                  compact state-to-state transition
//!   wait_2sleep_T                state_2to_T
//!   react_nod_IN_NT              nested transition in/out
//!   type_fast_keys_NL            state_action_sub_NL / _NQ
//! ```
//!
//! The parser is total: every input yields either metadata or a
//! [`GrammarError`], never a panic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emotion::Emotion;
use crate::engine::LoopMode;
use crate::states::CharacterState;

/// Errors from parsing a clip name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Name has no `_` separated type suffix
    #[error("Clip name '{0}' has too few segments")]
    TooFewSegments(String),

    /// Name contains an empty segment such as `wait__L`
    #[error("Clip name '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Type suffix is not one of L, Q, NL, NQ, T, IN_NT, OUT_NT
    #[error("Clip name '{name}' has unknown type suffix '{suffix}'")]
    UnknownKind {
        /// Offending clip name
        name: String,
        /// Suffix that did not parse
        suffix: String,
    },

    /// Emotional transition carries an unrecognized emotion tag
    #[error("Clip name '{name}' has unknown emotion '{tag}'")]
    UnknownEmotion {
        /// Offending clip name
        name: String,
        /// Tag that did not parse
        tag: String,
    },
}

/// What a clip is used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    /// `_L`: repeating idle
    Loop,
    /// `_Q`: one-shot fidget
    Quirk,
    /// `_NL`: repeating nested loop
    NestedLoop,
    /// `_NQ`: one-shot nested quirk
    NestedQuirk,
    /// `_IN_NT`: transition into a nested animation
    NestedTransitionIn,
    /// `_OUT_NT`: transition out of a nested animation
    NestedTransitionOut,
    /// `_T`: one-shot transition
    Transition,
}

impl ClipKind {
    /// Loop mode implied by the kind
    #[must_use]
    pub const fn loop_mode(self) -> LoopMode {
        match self {
            Self::Loop | Self::NestedLoop => LoopMode::Repeat,
            _ => LoopMode::OnceClamp,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "L" => Some(Self::Loop),
            "Q" => Some(Self::Quirk),
            "NL" => Some(Self::NestedLoop),
            "NQ" => Some(Self::NestedQuirk),
            "T" => Some(Self::Transition),
            _ => None,
        }
    }
}

/// Parsed description of a clip
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipMetadata {
    /// Owning state segment, e.g. `wait`
    pub state: String,

    /// Action segment as written, e.g. `idle` or `an2frown`
    pub action: String,

    /// Extra segment of nested clips
    pub sub_action: Option<String>,

    /// Target state for transition clips
    pub to_state: Option<String>,

    /// Emotion carried by the clip
    pub emotion: Emotion,

    /// Clip kind, which decides the loop mode
    pub kind: ClipKind,
}

impl ClipMetadata {
    /// Parse a legacy-grammar clip name
    pub fn parse(name: &str) -> Result<Self, GrammarError> {
        let parts: Vec<&str> = name.split('_').collect();
        if parts.len() < 2 {
            return Err(GrammarError::TooFewSegments(name.to_string()));
        }

        // `wait_2sleep_T` splits into an empty-free list, `wait__L` does not
        if parts.iter().any(|p| p.is_empty()) {
            return Err(GrammarError::EmptySegment(name.to_string()));
        }

        let (kind, body) = match parts.as_slice() {
            [body @ .., "IN", "NT"] => (ClipKind::NestedTransitionIn, body),
            [body @ .., "OUT", "NT"] => (ClipKind::NestedTransitionOut, body),
            [body @ .., suffix] => {
                let kind =
                    ClipKind::from_suffix(suffix).ok_or_else(|| GrammarError::UnknownKind {
                        name: name.to_string(),
                        suffix: (*suffix).to_string(),
                    })?;
                (kind, body)
            }
            [] => return Err(GrammarError::TooFewSegments(name.to_string())),
        };

        match body {
            [] => Err(GrammarError::TooFewSegments(name.to_string())),
            [compact] => Self::parse_compact(name, compact, kind),
            [state, action, tag]
                if kind == ClipKind::Transition && action.contains('2') =>
            {
                let emotion = Emotion::from_tag(tag).ok_or_else(|| GrammarError::UnknownEmotion {
                    name: name.to_string(),
                    tag: (*tag).to_string(),
                })?;
                let mut metadata = Self::from_segments(state, action, kind);
                metadata.emotion = emotion;
                Ok(metadata)
            }
            [state, action, rest @ ..] => {
                let mut metadata = Self::from_segments(state, action, kind);
                if !rest.is_empty() {
                    metadata.sub_action = Some(rest.join("_"));
                }
                Ok(metadata)
            }
        }
    }

    /// Metadata for a name outside the grammar.
    ///
    /// The clip is still playable; it is treated as a one-shot with no state.
    #[must_use]
    pub fn opaque(name: &str) -> Self {
        Self {
            state: String::new(),
            action: name.to_string(),
            sub_action: None,
            to_state: None,
            emotion: Emotion::Neutral,
            kind: ClipKind::Quirk,
        }
    }

    /// Owning state, if it names one of the four character states
    #[must_use]
    pub fn character_state(&self) -> Option<CharacterState> {
        self.state.parse().ok()
    }

    /// Whether the clip is any flavor of transition
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(
            self.kind,
            ClipKind::Transition | ClipKind::NestedTransitionIn | ClipKind::NestedTransitionOut
        )
    }

    // `type2wait_T`: the whole body is `from2to`
    fn parse_compact(name: &str, segment: &str, kind: ClipKind) -> Result<Self, GrammarError> {
        let Some((from, to)) = segment.split_once('2') else {
            return Err(GrammarError::TooFewSegments(name.to_string()));
        };
        if from.is_empty() || to.is_empty() {
            return Err(GrammarError::EmptySegment(name.to_string()));
        }
        Ok(Self {
            state: from.to_string(),
            action: segment.to_string(),
            sub_action: None,
            to_state: Some(to.to_string()),
            emotion: Emotion::Neutral,
            kind,
        })
    }

    fn from_segments(state: &str, action: &str, kind: ClipKind) -> Self {
        let mut metadata = Self {
            state: state.to_string(),
            action: action.to_string(),
            sub_action: None,
            to_state: None,
            emotion: Emotion::Neutral,
            kind,
        };

        if let Some((tag, target)) = action.split_once('2') {
            if let Some(emotion) = Emotion::from_tag(tag) {
                metadata.emotion = emotion;
            }
            if target.parse::<CharacterState>().is_ok() {
                metadata.to_state = Some(target.to_string());
            }
        } else if let Some(emotion) = Emotion::from_tag(action) {
            // `react_angry_L`: the action itself names the emotion
            metadata.emotion = emotion;
        }

        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loop() {
        let m = ClipMetadata::parse("wait_idle_L").unwrap();
        assert_eq!(m.state, "wait");
        assert_eq!(m.action, "idle");
        assert_eq!(m.kind, ClipKind::Loop);
        assert_eq!(m.emotion, Emotion::Neutral);
        assert_eq!(m.kind.loop_mode(), LoopMode::Repeat);
        assert_eq!(m.character_state(), Some(CharacterState::Wait));
    }

    #[test]
    fn test_parse_quirk_is_once() {
        let m = ClipMetadata::parse("wait_pickNose_Q").unwrap();
        assert_eq!(m.kind, ClipKind::Quirk);
        assert_eq!(m.kind.loop_mode(), LoopMode::OnceClamp);
    }

    #[test]
    fn test_parse_emotional_transition() {
        let m = ClipMetadata::parse("react_angry2type_angry_T").unwrap();
        assert_eq!(m.state, "react");
        assert_eq!(m.to_state.as_deref(), Some("type"));
        assert_eq!(m.emotion, Emotion::Angry);
        assert!(m.is_transition());
    }

    #[test]
    fn test_parse_emotion_tagged_action() {
        let frown = ClipMetadata::parse("react_an2frown_T").unwrap();
        assert_eq!(frown.emotion, Emotion::Angry);
        assert_eq!(frown.to_state, None);

        let to_type = ClipMetadata::parse("react_hp2type_T").unwrap();
        assert_eq!(to_type.emotion, Emotion::Happy);
        assert_eq!(to_type.to_state.as_deref(), Some("type"));

        let sad = ClipMetadata::parse("react_sad_L").unwrap();
        assert_eq!(sad.emotion, Emotion::Sad);
    }

    #[test]
    fn test_parse_compact_and_prefixed_transitions() {
        let compact = ClipMetadata::parse("type2wait_T").unwrap();
        assert_eq!(compact.state, "type");
        assert_eq!(compact.to_state.as_deref(), Some("wait"));

        let prefixed = ClipMetadata::parse("wait_2sleep_T").unwrap();
        assert_eq!(prefixed.state, "wait");
        assert_eq!(prefixed.to_state.as_deref(), Some("sleep"));
        assert_eq!(prefixed.emotion, Emotion::Neutral);
    }

    #[test]
    fn test_parse_nested() {
        let t_in = ClipMetadata::parse("react_nod_IN_NT").unwrap();
        assert_eq!(t_in.kind, ClipKind::NestedTransitionIn);
        assert_eq!(t_in.action, "nod");

        let t_out = ClipMetadata::parse("react_nod_OUT_NT").unwrap();
        assert_eq!(t_out.kind, ClipKind::NestedTransitionOut);

        let nl = ClipMetadata::parse("type_fast_keys_NL").unwrap();
        assert_eq!(nl.kind, ClipKind::NestedLoop);
        assert_eq!(nl.sub_action.as_deref(), Some("keys"));
        assert_eq!(nl.kind.loop_mode(), LoopMode::Repeat);

        let nq = ClipMetadata::parse("type_fast_sneeze_NQ").unwrap();
        assert_eq!(nq.kind.loop_mode(), LoopMode::OnceClamp);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            ClipMetadata::parse("idle"),
            Err(GrammarError::TooFewSegments(_))
        ));
        assert!(matches!(
            ClipMetadata::parse("wait__L"),
            Err(GrammarError::EmptySegment(_))
        ));
        assert!(matches!(
            ClipMetadata::parse("Owen_WaitIdle"),
            Err(GrammarError::UnknownKind { .. })
        ));
        assert!(matches!(
            ClipMetadata::parse("react_angry2type_bored_T"),
            Err(GrammarError::UnknownEmotion { .. })
        ));
        assert!(ClipMetadata::parse("").is_err());
        assert!(ClipMetadata::parse("_").is_err());
    }

    #[test]
    fn test_every_legacy_catalog_name_parses() {
        for name in crate::naming::names(crate::naming::Scheme::Legacy) {
            assert!(ClipMetadata::parse(name).is_ok(), "{name} failed to parse");
        }
    }
}
