//! Playback Engine Boundary
//!
//! The animation core never renders anything. It drives an external engine
//! through three capabilities:
//!
//! ```text
//!   ┌─────────────────┐  load_clips()   ┌──────────────────┐
//!   │ AnimationSource │ ──────────────▶ │   ClipLibrary    │
//!   └─────────────────┘                 └────────┬─────────┘
//!                                                │ clip_action()
//!                                       ┌────────▼─────────┐
//!                                       │      Mixer       │ advance(dt)
//!                                       └────────┬─────────┘
//!                                                │
//!                                       ┌────────▼─────────┐
//!                                       │   ClipAction     │ play/fade/stop
//!                                       └──────────────────┘
//! ```
//!
//! # Design Philosophy
//!
//! - **Opaque playback**: a clip is something that can be faded, played,
//!   stopped and asked whether it is still running. Nothing more.
//! - **Engine-owned time**: the mixer advances time only when the host calls
//!   [`Mixer::advance`], so tests control time completely.
//!
//! [`headless::HeadlessMixer`] implements these traits without a renderer.

pub mod headless;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an action behaves when it reaches the end of its clip
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Wrap around forever
    Repeat,
    /// Play once and hold the final pose
    OnceClamp,
}

/// Raw clip data handed over by an [`AnimationSource`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSource {
    /// Clip name as exported
    pub name: String,

    /// Clip length in seconds
    pub duration_secs: f32,

    /// Engine-specific payload (tracks, keyframes, ...), opaque to the core
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ClipSource {
    /// Create a source with no engine payload
    pub fn new(name: impl Into<String>, duration_secs: f32) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            data: serde_json::Value::Null,
        }
    }

    /// Attach an engine payload
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// A playing (or playable) instance of a clip inside a mixer
pub trait ClipAction: Send + Sync {
    /// Set repeat or play-once behavior
    fn set_loop(&self, mode: LoopMode);

    /// Rewind to the start and clear fades
    fn reset(&self);

    /// Ramp weight from 0 to 1 over `secs`
    fn fade_in(&self, secs: f32);

    /// Ramp weight down to 0 over `secs`
    fn fade_out(&self, secs: f32);

    /// Start playback
    fn play(&self);

    /// Stop immediately
    fn stop(&self);

    /// Whether the engine is still playing this action
    fn is_running(&self) -> bool;
}

/// Per-character animation mixer
pub trait Mixer: Send + Sync {
    /// Get the action for a clip; repeated calls return the same action
    fn clip_action(&self, source: &ClipSource) -> Arc<dyn ClipAction>;

    /// Advance engine time by `delta_secs`
    fn advance(&self, delta_secs: f32);

    /// Stop every action this mixer owns
    fn stop_all_action(&self);
}

/// Errors from loading clip sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// Asset could not be loaded
    #[error("Failed to load animation clips: {0}")]
    Load(String),
}

/// Supplier of clip data, consumed once at initialization
#[async_trait]
pub trait AnimationSource: Send + Sync {
    /// Load every clip the character model carries
    async fn load_clips(&self) -> Result<Vec<ClipSource>, SourceError>;
}

/// Source backed by a fixed in-memory list
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    clips: Vec<ClipSource>,
}

impl StaticSource {
    /// Wrap a list of clips
    #[must_use]
    pub fn new(clips: Vec<ClipSource>) -> Self {
        Self { clips }
    }

    /// Build a source from names, all with the same duration
    pub fn from_names<I, S>(names: I, duration_secs: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clips: names
                .into_iter()
                .map(|n| ClipSource::new(n, duration_secs))
                .collect(),
        }
    }
}

#[async_trait]
impl AnimationSource for StaticSource {
    async fn load_clips(&self) -> Result<Vec<ClipSource>, SourceError> {
        tracing::debug!(count = self.clips.len(), "Loading static clip sources");
        Ok(self.clips.clone())
    }
}
