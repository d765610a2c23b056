//! Animation Context
//!
//! The context owns everything one animated Owen needs: the clip library,
//! the four state handlers, the playback mixer and the inactivity timer.
//! Hosts drive it from two directions:
//!
//! ```text
//!   frame loop ──update(dt)──────────┐
//!                                    ▼
//!   user ──handle_user_message()──▶ AnimationContext ──▶ StateHandler ──▶ Clip
//!        ──on_user_activity()─────▶      │                                  │
//!                                        └──────── Mixer::advance ◀─────────┘
//! ```
//!
//! # Design Philosophy
//!
//! - **Frames never block**: `update` is synchronous. It only `try_lock`s the
//!   state machine, so a frame that lands mid-transition still advances the
//!   mixer, which is what lets the transition's clips finish.
//! - **Serialized transitions**: exit, swap, enter run under one async mutex.
//!   Overlapping requests queue in arrival order.
//! - **No re-entrancy**: handlers return the transitions they want; the
//!   context applies them.
//! - **Cheap to clone**: the context is a handle over shared state, so a
//!   frame driver task and a message handler can hold it at the same time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::clip::{Clip, ClipError, ClipLibrary};
use crate::config::OwenConfig;
use crate::emotion::Emotion;
use crate::engine::{AnimationSource, Mixer, SourceError};
use crate::naming::NameMapper;
use crate::states::{CharacterState, Stage, StateHandler, UnknownStateError};

// ============================================================================
// Error Types
// ============================================================================

/// Animation context errors
#[derive(Debug, Error)]
pub enum ContextError {
    /// Requested state is not registered
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    /// Operation needs `initialize()` first
    #[error("Animation context is not initialized")]
    NotInitialized,

    /// Clip binding failed
    #[error(transparent)]
    Clip(#[from] ClipError),

    /// Clip source failed to load
    #[error(transparent)]
    Source(#[from] SourceError),
}

// ============================================================================
// Snapshot
// ============================================================================

/// Serializable view of the context
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Whether `initialize()` has completed
    pub initialized: bool,
    /// Active state
    pub current_state: Option<CharacterState>,
    /// Emotion carried by the active state
    pub emotion: Emotion,
    /// Time since the last user activity
    pub inactivity: Duration,
    /// Completed transitions since initialization
    pub transitions: u64,
    /// Clips in the library
    pub clip_count: usize,
}

#[derive(Clone, Debug, Default)]
struct Status {
    initialized: bool,
    current: Option<CharacterState>,
    emotion: Emotion,
    transitions: u64,
    registered: Vec<CharacterState>,
}

#[derive(Debug, Default)]
struct Machine {
    handlers: HashMap<CharacterState, StateHandler>,
    current: Option<CharacterState>,
}

impl Machine {
    fn active_mut(&mut self) -> Option<&mut StateHandler> {
        let current = self.current?;
        self.handlers.get_mut(&current)
    }

    fn active(&self) -> Option<&StateHandler> {
        self.current.and_then(|state| self.handlers.get(&state))
    }
}

struct ContextInner {
    stage: Stage,
    mixer: Arc<dyn Mixer>,
    source: Arc<dyn AnimationSource>,
    machine: tokio::sync::Mutex<Machine>,
    inactivity: Mutex<Duration>,
    sleep_pending: AtomicBool,
    background: Mutex<Vec<JoinHandle<()>>>,
    status: RwLock<Status>,
}

// ============================================================================
// Context
// ============================================================================

/// State machine driving one animated character
#[derive(Clone)]
pub struct AnimationContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.inner.status.read();
        f.debug_struct("AnimationContext")
            .field("initialized", &status.initialized)
            .field("current", &status.current)
            .field("clips", &self.inner.stage.library().len())
            .finish_non_exhaustive()
    }
}

impl AnimationContext {
    /// Create an uninitialized context
    #[must_use]
    pub fn new(
        mixer: Arc<dyn Mixer>,
        source: Arc<dyn AnimationSource>,
        mapper: Arc<NameMapper>,
        config: OwenConfig,
    ) -> Self {
        let stage = Stage::new(Arc::new(ClipLibrary::new()), mapper, Arc::new(config));
        Self {
            inner: Arc::new(ContextInner {
                stage,
                mixer,
                source,
                machine: tokio::sync::Mutex::new(Machine::default()),
                inactivity: Mutex::new(Duration::ZERO),
                sleep_pending: AtomicBool::new(false),
                background: Mutex::new(Vec::new()),
                status: RwLock::new(Status::default()),
            }),
        }
    }

    /// Load clips, register the state handlers and enter `wait`.
    ///
    /// Calling this again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the clip source cannot be loaded or a clip cannot be bound.
    pub async fn initialize(&self) -> Result<(), ContextError> {
        let mut machine = self.inner.machine.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        let sources = self.inner.source.load_clips().await?;
        let library = self.inner.stage.library();
        library.load(sources, self.inner.stage.mapper());
        library.bind_all(&self.inner.mixer)?;

        for state in CharacterState::ALL {
            machine
                .handlers
                .insert(state, StateHandler::new(state, self.inner.stage.clone()));
        }
        self.inner.status.write().registered = CharacterState::ALL.to_vec();

        self.transition_locked(&mut machine, CharacterState::Wait, Emotion::Neutral)
            .await?;

        self.inner.status.write().initialized = true;
        tracing::info!(clips = library.len(), "Owen animation system initialized");
        Ok(())
    }

    /// Whether `initialize()` has completed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.status.read().initialized
    }

    /// Move to `state`, running the current state's exit then the new state's enter.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotInitialized`] before `initialize()`,
    /// [`ContextError::UnknownState`] if `state` has no handler.
    pub async fn transition_to(&self, state: CharacterState, emotion: Emotion) -> Result<(), ContextError> {
        let mut machine = self.inner.machine.lock().await;
        self.transition_locked(&mut machine, state, emotion).await
    }

    /// [`transition_to`](Self::transition_to) addressed by state name
    ///
    /// # Errors
    ///
    /// [`ContextError::UnknownState`] if `name` is not a state.
    pub async fn transition_to_named(&self, name: &str, emotion: Emotion) -> Result<(), ContextError> {
        let state: CharacterState = name.parse()?;
        self.transition_to(state, emotion).await
    }

    async fn transition_locked(
        &self,
        machine: &mut Machine,
        to: CharacterState,
        emotion: Emotion,
    ) -> Result<(), ContextError> {
        if machine.handlers.is_empty() {
            return Err(ContextError::NotInitialized);
        }
        if !machine.handlers.contains_key(&to) {
            return Err(UnknownStateError(to.to_string()).into());
        }

        let from = machine.current;
        tracing::info!(from = ?from, %to, %emotion, "State transition");

        if let Some(handler) = machine.active_mut() {
            handler.exit(to, emotion).await;
        }

        machine.current = Some(to);
        if let Some(handler) = machine.active_mut() {
            handler.enter(from, emotion).await;
        }

        self.refresh_status(machine);
        self.inner.status.write().transitions += 1;
        self.reset_inactivity();
        Ok(())
    }

    fn refresh_status(&self, machine: &Machine) {
        let emotion = machine.active().map_or(Emotion::Neutral, StateHandler::emotion);
        let mut status = self.inner.status.write();
        status.current = machine.current;
        status.emotion = emotion;
    }

    /// React to a user message.
    ///
    /// Sleep and wait escalate to react first, the react handler classifies
    /// the message, and react then moves on to type carrying that emotion.
    /// Returns the emotion the message was classified as.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotInitialized`] before `initialize()`.
    pub async fn handle_user_message(&self, message: &str) -> Result<Emotion, ContextError> {
        if !self.is_initialized() {
            return Err(ContextError::NotInitialized);
        }
        tracing::info!(len = message.len(), "Handling user message");
        self.reset_inactivity();

        let mut machine = self.inner.machine.lock().await;

        if matches!(
            machine.current,
            Some(CharacterState::Sleep | CharacterState::Wait)
        ) {
            self.transition_locked(&mut machine, CharacterState::React, Emotion::Neutral)
                .await?;
        }

        let outcome = match machine.active_mut() {
            Some(handler) => handler.handle_message(message).await,
            None => return Err(ContextError::NotInitialized),
        };
        self.refresh_status(&machine);

        if let Some(requested) = outcome.request {
            if machine.current != Some(requested) {
                self.transition_locked(&mut machine, requested, outcome.emotion)
                    .await?;
            }
        }

        if machine.current == Some(CharacterState::React) {
            self.transition_locked(&mut machine, CharacterState::Type, outcome.emotion)
                .await?;
        }

        Ok(outcome.emotion)
    }

    /// Note user activity; wakes Owen if asleep.
    ///
    /// # Errors
    ///
    /// Propagates transition errors from waking up.
    pub async fn on_user_activity(&self) -> Result<(), ContextError> {
        self.reset_inactivity();
        if self.current_state() == Some(CharacterState::Sleep) {
            let mut machine = self.inner.machine.lock().await;
            // re-check under the lock, a queued transition may have woken us
            if machine.current == Some(CharacterState::Sleep) {
                self.transition_locked(&mut machine, CharacterState::Wait, Emotion::Neutral)
                    .await?;
            }
        }
        Ok(())
    }

    /// Wake from sleep into `wait`; no-op when not in deep sleep
    ///
    /// # Errors
    ///
    /// Propagates transition errors.
    pub async fn wake_up(&self) -> Result<(), ContextError> {
        let mut machine = self.inner.machine.lock().await;
        let deep = machine
            .active()
            .and_then(StateHandler::as_sleep)
            .is_some_and(|sleep| sleep.is_deep_sleep());
        if deep {
            self.transition_locked(&mut machine, CharacterState::Wait, Emotion::Neutral)
                .await?;
        }
        Ok(())
    }

    /// Let the typing state play its finishing clip; no-op in other states
    pub async fn finish_typing(&self) {
        let mut machine = self.inner.machine.lock().await;
        if let Some(typing) = machine.active_mut().and_then(StateHandler::as_type_mut) {
            typing.finish_typing().await;
        }
    }

    /// Whether the typing state is mid-response
    pub async fn is_typing(&self) -> bool {
        let mut machine = self.inner.machine.lock().await;
        machine
            .active_mut()
            .and_then(StateHandler::as_type_mut)
            .is_some_and(|typing| typing.is_typing())
    }

    /// Per-frame tick.
    ///
    /// Advances the mixer, ticks the active handler unless a transition is
    /// running, and schedules one sleep transition once the inactivity
    /// timeout passes.
    pub fn update(&self, delta: Duration) {
        if !self.is_initialized() {
            return;
        }

        self.inner.mixer.advance(delta.as_secs_f32());

        if let Ok(mut machine) = self.inner.machine.try_lock() {
            if let Some(handler) = machine.active_mut() {
                handler.update(delta);
            }
        }

        let idle = {
            let mut inactivity = self.inner.inactivity.lock();
            *inactivity += delta;
            *inactivity
        };

        if idle > self.stage().config().inactivity_timeout
            && self.current_state() != Some(CharacterState::Sleep)
            && !self.inner.sleep_pending.swap(true, Ordering::AcqRel)
        {
            self.schedule_sleep();
        }
    }

    fn schedule_sleep(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Inactivity timeout reached outside a tokio runtime, not sleeping");
            self.inner.sleep_pending.store(false, Ordering::Release);
            return;
        };

        tracing::info!("Inactivity detected, transitioning to sleep");
        let ctx = self.clone();
        let handle = runtime.spawn(async move {
            ctx.fall_asleep().await;
        });

        let mut background = self.inner.background.lock();
        background.retain(|task| !task.is_finished());
        background.push(handle);
    }

    async fn fall_asleep(&self) {
        let mut machine = self.inner.machine.lock().await;
        // activity may have arrived while the task was queued
        let still_idle = *self.inner.inactivity.lock() > self.stage().config().inactivity_timeout;
        if still_idle && machine.current != Some(CharacterState::Sleep) {
            if let Err(e) = self
                .transition_locked(&mut machine, CharacterState::Sleep, Emotion::Neutral)
                .await
            {
                tracing::warn!(error = %e, "Failed to fall asleep");
            }
        }
        self.inner.sleep_pending.store(false, Ordering::Release);
    }

    /// Wait for scheduled background transitions to finish
    pub async fn settle(&self) {
        loop {
            let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.inner.background.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    tracing::warn!(error = %e, "Background transition task failed");
                }
            }
        }
    }

    fn reset_inactivity(&self) {
        *self.inner.inactivity.lock() = Duration::ZERO;
    }

    /// Time since the last user activity or transition
    #[must_use]
    pub fn inactivity(&self) -> Duration {
        *self.inner.inactivity.lock()
    }

    fn stage(&self) -> &Stage {
        &self.inner.stage
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Look up a clip by any scheme spelling or `*` pattern
    #[must_use]
    pub fn get_clip(&self, name: &str) -> Option<Arc<Clip>> {
        self.stage().clip(name)
    }

    /// Clips matching a `*` wildcard pattern
    #[must_use]
    pub fn clips_by_pattern(&self, pattern: &str) -> Vec<Arc<Clip>> {
        self.stage().clips_by_pattern(pattern)
    }

    /// Names of all loaded clips
    #[must_use]
    pub fn available_clips(&self) -> Vec<String> {
        self.stage().library().names()
    }

    /// States with a registered handler
    #[must_use]
    pub fn available_states(&self) -> Vec<CharacterState> {
        self.inner.status.read().registered.clone()
    }

    /// States reachable from the current one
    #[must_use]
    pub fn available_transitions(&self) -> Vec<CharacterState> {
        self.current_state()
            .map(|state| state.transitions().to_vec())
            .unwrap_or_default()
    }

    /// Active state, `None` before initialization
    #[must_use]
    pub fn current_state(&self) -> Option<CharacterState> {
        self.inner.status.read().current
    }

    /// Emotion carried by the active state
    #[must_use]
    pub fn current_emotion(&self) -> Emotion {
        self.inner.status.read().emotion
    }

    /// Emotion last recorded by a specific state's handler
    pub async fn state_emotion(&self, state: CharacterState) -> Option<Emotion> {
        let machine = self.inner.machine.lock().await;
        machine.handlers.get(&state).map(StateHandler::emotion)
    }

    /// Serializable view of the context
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        let status = self.inner.status.read().clone();
        ContextSnapshot {
            initialized: status.initialized,
            current_state: status.current,
            emotion: status.emotion,
            inactivity: self.inactivity(),
            transitions: status.transitions,
            clip_count: self.stage().library().len(),
        }
    }

    /// Name mapper shared with this context
    #[must_use]
    pub fn mapper(&self) -> &Arc<NameMapper> {
        self.stage().mapper()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &OwenConfig {
        self.stage().config()
    }

    /// Stop everything and return to the uninitialized state.
    ///
    /// The context can be initialized again afterwards.
    pub async fn dispose(&self) {
        let mut machine = self.inner.machine.lock().await;

        for task in std::mem::take(&mut *self.inner.background.lock()) {
            task.abort();
        }
        self.inner.sleep_pending.store(false, Ordering::Release);

        self.stage().library().clear();
        self.inner.mixer.stop_all_action();
        machine.handlers.clear();
        machine.current = None;
        *self.inner.status.write() = Status::default();
        self.reset_inactivity();

        tracing::info!("Owen animation system disposed");
    }
}
