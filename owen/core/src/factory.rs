//! System Factory
//!
//! Wires a mixer, a clip source, the name mapper and configuration into an
//! initialized [`AnimationContext`]. Hosts that embed a real engine call
//! [`OwenSystemFactory::create_owen_system`]; tests and tools without a
//! renderer use [`OwenSystemFactory::create_headless_system`].

use std::sync::Arc;

use crate::config::{load_config, OwenConfig};
use crate::context::{AnimationContext, ContextError};
use crate::engine::headless::HeadlessMixer;
use crate::engine::{AnimationSource, ClipSource, Mixer, StaticSource};
use crate::naming::NameMapper;

/// Builds complete Owen animation systems
#[derive(Debug, Clone, Copy, Default)]
pub struct OwenSystemFactory;

impl OwenSystemFactory {
    /// Create and initialize a system over a host-provided engine
    ///
    /// # Errors
    ///
    /// Returns an error if the clips cannot be loaded or bound.
    pub async fn create_owen_system(
        mixer: Arc<dyn Mixer>,
        source: Arc<dyn AnimationSource>,
        config: OwenConfig,
    ) -> Result<AnimationContext, ContextError> {
        let ctx = AnimationContext::new(mixer, source, Arc::new(NameMapper::new()), config);
        ctx.initialize().await?;
        Ok(ctx)
    }

    /// Like [`create_owen_system`](Self::create_owen_system), with
    /// configuration loaded from the config file and `OWEN_*` environment.
    ///
    /// A missing or invalid config file falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the clips cannot be loaded or bound.
    pub async fn create_basic_owen_system(
        mixer: Arc<dyn Mixer>,
        source: Arc<dyn AnimationSource>,
    ) -> Result<AnimationContext, ContextError> {
        let config = load_config().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load animation config, using defaults");
            OwenConfig::default()
        });
        Self::create_owen_system(mixer, source, config).await
    }

    /// Create and initialize a system backed by the [`HeadlessMixer`].
    ///
    /// The mixer handle is returned so callers can drive and inspect playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the clips cannot be bound.
    pub async fn create_headless_system(
        clips: Vec<ClipSource>,
        config: OwenConfig,
    ) -> Result<(AnimationContext, Arc<HeadlessMixer>), ContextError> {
        let mixer = Arc::new(HeadlessMixer::new());
        let ctx = Self::create_owen_system(
            mixer.clone(),
            Arc::new(StaticSource::new(clips)),
            config,
        )
        .await?;
        Ok((ctx, mixer))
    }
}
