//! Wait state: idle loop with random quirks
//!
//! Quirks are scheduled from the per-frame `update`, never awaited. The
//! handler fades the idle loop out, starts a quirk, and on later frames
//! notices the quirk has ended and brings the idle loop back.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{stop_clip, CharacterState, Stage};
use crate::clip::{Clip, ClipKind};
use crate::emotion::Emotion;

const IDLE_CLIP: &str = "wait_idle_L";
const QUIRK_PATTERN: &str = "wait_*_Q";

/// Handler for [`CharacterState::Wait`]
#[derive(Debug)]
pub struct WaitState {
    stage: Stage,
    idle: Option<Arc<Clip>>,
    current: Option<Arc<Clip>>,
    quirks: Vec<Arc<Clip>>,
    active_quirk: Option<Arc<Clip>>,
    quirk_timer: Duration,
    rng: StdRng,
}

impl WaitState {
    /// Create the handler; quirk rolls are seeded from config when set
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        let rng = match stage.config().rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            stage,
            idle: None,
            current: None,
            quirks: Vec::new(),
            active_quirk: None,
            quirk_timer: Duration::ZERO,
            rng,
        }
    }

    pub(crate) async fn enter(&mut self, from: Option<CharacterState>, _emotion: Emotion) {
        tracing::info!(from = ?from, "Entering wait state");

        self.idle = self.stage.clip(IDLE_CLIP);
        if let Some(idle) = &self.idle {
            idle.play(self.stage.config().fade_in_secs());
            self.current = Some(Arc::clone(idle));
        }

        self.quirks = self.collect_quirks();
        self.active_quirk = None;
        self.quirk_timer = Duration::ZERO;
        tracing::debug!(quirks = self.quirks.len(), "Wait quirks collected");
    }

    /// Legacy `wait_*_Q` hits first, then quirks found under any other scheme
    fn collect_quirks(&self) -> Vec<Arc<Clip>> {
        let mut quirks = self.stage.clips_by_pattern(QUIRK_PATTERN);
        let by_metadata = self.stage.library().by_metadata(|m| {
            m.kind == ClipKind::Quirk && m.character_state() == Some(CharacterState::Wait)
        });
        for clip in by_metadata {
            if !quirks.iter().any(|q| q.name() == clip.name()) {
                quirks.push(clip);
            }
        }
        quirks
    }

    pub(crate) async fn exit(&mut self, to: CharacterState, _emotion: Emotion) {
        tracing::info!(%to, "Exiting wait state");

        if let Some(quirk) = self.active_quirk.take() {
            quirk.halt();
        }
        stop_clip(&mut self.current, self.stage.config().fade_out_secs()).await;

        // sleep plays wait_2sleep_T on its own way in
        if to != CharacterState::Sleep {
            self.stage
                .play_transition(CharacterState::Wait, to, Emotion::Neutral)
                .await;
        }
    }

    pub(crate) fn update(&mut self, delta: Duration) {
        if let Some(quirk) = &self.active_quirk {
            if quirk.is_playing() {
                return;
            }
            tracing::debug!(quirk = %quirk.name(), "Quirk finished, back to idle");
            self.active_quirk = None;
            self.current = None;
            if let Some(idle) = &self.idle {
                idle.play(self.stage.config().quirk_fade_secs());
                self.current = Some(Arc::clone(idle));
            }
            return;
        }

        self.quirk_timer += delta;
        if self.quirk_timer <= self.stage.config().quirk_interval {
            return;
        }
        self.quirk_timer = Duration::ZERO;

        let roll: f32 = self.rng.gen();
        if roll >= self.stage.config().quirk_probability {
            return;
        }
        let Some(quirk) = self.quirks.choose(&mut self.rng).cloned() else {
            return;
        };

        let fade = self.stage.config().quirk_fade_secs();
        if let Some(idle) = &self.idle {
            idle.fade_out(fade);
        }
        quirk.play(fade);
        tracing::debug!(quirk = %quirk.name(), "Playing wait quirk");
        self.current = Some(Arc::clone(&quirk));
        self.active_quirk = Some(quirk);
    }

    /// Clip currently playing
    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        self.current.as_ref()
    }

    /// Whether a quirk is in progress
    #[must_use]
    pub fn is_quirk_active(&self) -> bool {
        self.active_quirk.is_some()
    }
}
