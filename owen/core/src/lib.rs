//! Owen Core - Headless Character Animation for Owen
//!
//! This crate decides *which* animation Owen plays and *when*. It never
//! renders: a host engine plugs in through the [`engine`] traits and calls
//! [`AnimationContext::update`] once per frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Host Engine                              │
//! │   frame loop ──update(dt)──┐        user ──handle_user_message()  │
//! └────────────────────────────┼───────────────────┬──────────────────┘
//!                              │                   │
//! ┌────────────────────────────┼───────────────────┼──────────────────┐
//! │                      OWEN CORE                 │                  │
//! │  ┌─────────────────────────┴───────────────────┴───────────────┐  │
//! │  │                    AnimationContext                          │  │
//! │  │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐                 │  │
//! │  │  │  Wait  │ │ React  │ │  Type  │ │ Sleep  │  StateHandler   │  │
//! │  │  └────────┘ └────────┘ └────────┘ └────────┘                 │  │
//! │  └─────────────────────────┬────────────────────────────────────┘  │
//! │           ┌────────────────┴───────────┐                          │
//! │  ┌────────┴────────┐          ┌────────┴────────┐                 │
//! │  │   ClipLibrary   │◀─────────│   NameMapper    │ 4 naming schemes│
//! │  └────────┬────────┘          └─────────────────┘                 │
//! │           │ Mixer / ClipAction                                     │
//! └───────────┼────────────────────────────────────────────────────────┘
//!             ▼
//!        host mixer (or HeadlessMixer)
//! ```
//!
//! # Key Types
//!
//! - [`AnimationContext`]: the character state machine
//! - [`NameMapper`]: converts clip names between the four naming schemes
//! - [`Clip`] / [`ClipLibrary`]: named clips bound to a mixer
//! - [`StateHandler`]: the closed set of per-state behaviors
//! - [`OwenSystemFactory`]: builds an initialized system
//!
//! # Quick Start
//!
//! ```ignore
//! use owen_core::{ClipSource, OwenConfig, OwenSystemFactory};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let clips = vec![
//!         ClipSource::new("wait_idle_L", 2.0),
//!         ClipSource::new("react_idle_L", 2.0),
//!         ClipSource::new("type_idle_L", 2.0),
//!     ];
//!     let (owen, _mixer) = OwenSystemFactory::create_headless_system(clips, OwenConfig::from_env())
//!         .await
//!         .unwrap();
//!
//!     let frames = owen.clone();
//!     tokio::spawn(async move {
//!         loop {
//!             frames.update(Duration::from_millis(16));
//!             tokio::time::sleep(Duration::from_millis(16)).await;
//!         }
//!     });
//!
//!     owen.handle_user_message("Great work!").await.unwrap();
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`naming`]: scheme catalog and the name mapper
//! - [`clip`]: clip metadata grammar, clips and the clip library
//! - [`engine`]: playback capability traits and the headless mixer
//! - [`emotion`]: emotions and message classification
//! - [`states`]: character states and their handlers
//! - [`context`]: the animation context
//! - [`factory`]: system construction
//! - [`config`]: configuration from defaults, TOML and environment

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clip;
pub mod config;
pub mod context;
pub mod emotion;
pub mod engine;
pub mod factory;
pub mod naming;
pub mod states;

// Re-exports for convenience
pub use clip::{Clip, ClipError, ClipKind, ClipLibrary, ClipMetadata, GrammarError};
pub use context::{AnimationContext, ContextError, ContextSnapshot};
pub use emotion::{classify_message, Emotion};
pub use engine::headless::HeadlessMixer;
pub use engine::{AnimationSource, ClipAction, ClipSource, LoopMode, Mixer, SourceError, StaticSource};
pub use factory::OwenSystemFactory;
pub use naming::{
    AnimationFilter, AnimationNames, BatchConversion, ConflictKind, MapperError, NameMapper,
    NamingConflict, Scheme, ValidationResult,
};
pub use states::{CharacterState, MessageOutcome, Stage, StateHandler, UnknownStateError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, OwenConfig,
};
