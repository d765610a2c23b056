//! Character States
//!
//! Owen is always in exactly one of four states once initialized:
//!
//! ```text
//!   ┌──────┐  message   ┌───────┐  message   ┌──────┐
//!   │ Wait │ ─────────▶ │ React │ ─────────▶ │ Type │
//!   └──────┘            └───────┘            └──────┘
//!    │   ▲                  ▲
//!    │   │ activity         │ message
//!    ▼   │                  │
//!   ┌──────┐ ───────────────┘
//!   │Sleep │
//!   └──────┘
//!
//!   wait  -> react, sleep      type  -> wait, react
//!   react -> type, wait        sleep -> wait, react
//! ```
//!
//! Each state has a handler owning its clips. Handlers never reach back into
//! the animation context; they get a [`Stage`] for clip lookup and return a
//! [`MessageOutcome`] when they want the context to move on.

pub mod react;
pub mod sleep;
pub mod typing;
pub mod wait;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clip::{Clip, ClipLibrary};
use crate::config::OwenConfig;
use crate::emotion::Emotion;
use crate::naming::NameMapper;

pub use react::ReactState;
pub use sleep::SleepState;
pub use typing::TypeState;
pub use wait::WaitState;

/// A state name that is not one of the four character states
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("State '{0}' not found")]
pub struct UnknownStateError(pub String);

/// Behavioral state of the character
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterState {
    /// Idle, waiting for the user
    Wait,
    /// Reacting to a message
    React,
    /// Typing a response
    Type,
    /// Asleep after inactivity
    Sleep,
}

impl CharacterState {
    /// All states in registration order
    pub const ALL: [CharacterState; 4] = [
        CharacterState::Wait,
        CharacterState::React,
        CharacterState::Type,
        CharacterState::Sleep,
    ];

    /// Name as used in clip names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::React => "react",
            Self::Type => "type",
            Self::Sleep => "sleep",
        }
    }

    /// States reachable from this one
    #[must_use]
    pub const fn transitions(self) -> &'static [CharacterState] {
        match self {
            Self::Wait => &[Self::React, Self::Sleep],
            Self::React => &[Self::Type, Self::Wait],
            Self::Type => &[Self::Wait, Self::React],
            Self::Sleep => &[Self::Wait, Self::React],
        }
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait" => Ok(Self::Wait),
            "react" => Ok(Self::React),
            "type" => Ok(Self::Type),
            "sleep" => Ok(Self::Sleep),
            other => Err(UnknownStateError(other.to_string())),
        }
    }
}

/// What a handler decided while processing a message
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageOutcome {
    /// Emotion the handler settled on
    pub emotion: Emotion,
    /// Transition the handler wants the context to perform
    pub request: Option<CharacterState>,
}

/// Clip lookup and timing shared by all handlers
#[derive(Clone, Debug)]
pub struct Stage {
    clips: Arc<ClipLibrary>,
    mapper: Arc<NameMapper>,
    config: Arc<OwenConfig>,
}

impl Stage {
    /// Create a stage over a clip library
    #[must_use]
    pub fn new(clips: Arc<ClipLibrary>, mapper: Arc<NameMapper>, config: Arc<OwenConfig>) -> Self {
        Self {
            clips,
            mapper,
            config,
        }
    }

    /// Animation configuration
    #[must_use]
    pub fn config(&self) -> &OwenConfig {
        &self.config
    }

    /// Name mapper
    #[must_use]
    pub fn mapper(&self) -> &Arc<NameMapper> {
        &self.mapper
    }

    /// Clip library
    #[must_use]
    pub fn library(&self) -> &Arc<ClipLibrary> {
        &self.clips
    }

    /// Find a clip by name.
    ///
    /// Tries, in order: the exact name; every scheme spelling of the name;
    /// a `*` wildcard match when the name contains one, otherwise a
    /// case-insensitive match.
    #[must_use]
    pub fn clip(&self, name: &str) -> Option<Arc<Clip>> {
        if let Some(clip) = self.clips.get(name) {
            return Some(clip);
        }

        if let Ok(names) = self.mapper.all_names(name) {
            if let Some(clip) = names.iter().find_map(|(_, variant)| self.clips.get(variant)) {
                return Some(clip);
            }
        }

        if name.contains('*') {
            self.clips.by_pattern(name).into_iter().next()
        } else {
            self.clips.find_ignore_case(name)
        }
    }

    /// Clips matching a `*` wildcard pattern
    #[must_use]
    pub fn clips_by_pattern(&self, pattern: &str) -> Vec<Arc<Clip>> {
        self.clips.by_pattern(pattern)
    }

    /// Play a clip and wait until it stops or the wait times out
    pub async fn play_to_end(&self, clip: &Clip) -> bool {
        clip.play(self.config.fade_in_secs());
        clip.wait_for_end(self.config.clip_poll_interval, self.config.clip_wait_timeout)
            .await
    }

    /// Play the first available transition clip from `from` to `to`
    pub async fn play_transition(&self, from: CharacterState, to: CharacterState, emotion: Emotion) {
        let candidates = transition_candidates(from, to, emotion);
        match candidates.iter().find_map(|name| self.clip(name)) {
            Some(clip) => {
                tracing::debug!(%from, %to, clip = %clip.name(), "Playing transition clip");
                self.play_to_end(&clip).await;
            }
            None => tracing::debug!(%from, %to, %emotion, "No transition clip available"),
        }
    }
}

/// Name of the transition clip between two states
#[must_use]
pub fn transition_clip_name(from: CharacterState, to: CharacterState, emotion: Emotion) -> String {
    match emotion.suffix() {
        Some(e) => format!("{from}_{e}2{to}_{e}_T"),
        None => format!("{from}_2{to}_T"),
    }
}

/// Transition clip names in preference order.
///
/// The emotional clip comes first, then the catalog's short-code spelling
/// (`react_hp2type_T`), then the neutral clip, then the compact
/// `type2wait_T` spelling.
#[must_use]
pub fn transition_candidates(from: CharacterState, to: CharacterState, emotion: Emotion) -> Vec<String> {
    let mut names = Vec::with_capacity(4);
    if !emotion.is_neutral() {
        names.push(transition_clip_name(from, to, emotion));
    }
    if let Some(code) = emotion.catalog_code() {
        names.push(format!("{from}_{code}2{to}_T"));
    }
    names.push(transition_clip_name(from, to, Emotion::Neutral));
    names.push(format!("{from}2{to}_T"));
    names
}

/// Stop the clip in `slot` (if any) and clear it
pub(crate) async fn stop_clip(slot: &mut Option<Arc<Clip>>, fade_out_secs: f32) {
    if let Some(clip) = slot.take() {
        clip.stop(fade_out_secs).await;
    }
}

/// One handler per character state
#[derive(Debug)]
pub enum StateHandler {
    /// Idle with random quirks
    Wait(WaitState),
    /// Emotional reaction to a message
    React(ReactState),
    /// Typing a response
    Type(TypeState),
    /// Sleeping
    Sleep(SleepState),
}

impl StateHandler {
    /// Create the handler for `state`
    #[must_use]
    pub fn new(state: CharacterState, stage: Stage) -> Self {
        match state {
            CharacterState::Wait => Self::Wait(WaitState::new(stage)),
            CharacterState::React => Self::React(ReactState::new(stage)),
            CharacterState::Type => Self::Type(TypeState::new(stage)),
            CharacterState::Sleep => Self::Sleep(SleepState::new(stage)),
        }
    }

    /// State this handler implements
    #[must_use]
    pub fn state(&self) -> CharacterState {
        match self {
            Self::Wait(_) => CharacterState::Wait,
            Self::React(_) => CharacterState::React,
            Self::Type(_) => CharacterState::Type,
            Self::Sleep(_) => CharacterState::Sleep,
        }
    }

    /// Start the state's clips
    pub async fn enter(&mut self, from: Option<CharacterState>, emotion: Emotion) {
        match self {
            Self::Wait(h) => h.enter(from, emotion).await,
            Self::React(h) => h.enter(from, emotion).await,
            Self::Type(h) => h.enter(from, emotion).await,
            Self::Sleep(h) => h.enter(from, emotion).await,
        }
    }

    /// Stop the state's clips and play the way out
    pub async fn exit(&mut self, to: CharacterState, emotion: Emotion) {
        match self {
            Self::Wait(h) => h.exit(to, emotion).await,
            Self::React(h) => h.exit(to, emotion).await,
            Self::Type(h) => h.exit(to, emotion).await,
            Self::Sleep(h) => h.exit(to, emotion).await,
        }
    }

    /// Per-frame tick
    pub fn update(&mut self, delta: Duration) {
        match self {
            Self::Wait(h) => h.update(delta),
            Self::React(_) | Self::Type(_) | Self::Sleep(_) => {}
        }
    }

    /// React to a user message
    pub async fn handle_message(&mut self, message: &str) -> MessageOutcome {
        match self {
            Self::React(h) => h.handle_message(message).await,
            Self::Sleep(h) => h.handle_message(message),
            Self::Wait(_) | Self::Type(_) => MessageOutcome::default(),
        }
    }

    /// States reachable from here
    #[must_use]
    pub fn available_transitions(&self) -> &'static [CharacterState] {
        self.state().transitions()
    }

    /// Clip currently owned by the state
    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        match self {
            Self::Wait(h) => h.current_clip(),
            Self::React(h) => h.current_clip(),
            Self::Type(h) => h.current_clip(),
            Self::Sleep(h) => h.current_clip(),
        }
    }

    /// Emotion the state is carrying
    #[must_use]
    pub fn emotion(&self) -> Emotion {
        match self {
            Self::React(h) => h.emotion(),
            Self::Type(h) => h.emotion(),
            Self::Wait(_) | Self::Sleep(_) => Emotion::Neutral,
        }
    }

    /// Typing handler, if this is one
    pub fn as_type_mut(&mut self) -> Option<&mut TypeState> {
        match self {
            Self::Type(h) => Some(h),
            _ => None,
        }
    }

    /// Sleep handler, if this is one
    #[must_use]
    pub fn as_sleep(&self) -> Option<&SleepState> {
        match self {
            Self::Sleep(h) => Some(h),
            _ => None,
        }
    }
}
