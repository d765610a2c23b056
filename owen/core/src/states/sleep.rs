//! Sleep state: entered after inactivity, left on any stimulus

use std::sync::Arc;

use super::{stop_clip, CharacterState, MessageOutcome, Stage};
use crate::clip::Clip;
use crate::emotion::Emotion;

const FALL_ASLEEP_CLIP: &str = "wait_2sleep_T";
const SLEEP_CLIP: &str = "sleep_idle_L";
const WAKE_UP_CLIP: &str = "sleep_wakeup_T";
/// Catalog spelling of the wake-up clip
const CATALOG_WAKE_UP_CLIP: &str = "sleep2wake_T";

/// Handler for [`CharacterState::Sleep`]
#[derive(Debug)]
pub struct SleepState {
    stage: Stage,
    current: Option<Arc<Clip>>,
    deep_sleep: bool,
}

impl SleepState {
    /// Create the handler
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            current: None,
            deep_sleep: false,
        }
    }

    pub(crate) async fn enter(&mut self, from: Option<CharacterState>, _emotion: Emotion) {
        tracing::info!(from = ?from, "Entering sleep state");

        if let Some(transition) = self.stage.clip(FALL_ASLEEP_CLIP) {
            self.stage.play_to_end(&transition).await;
        }

        if let Some(clip) = self.stage.clip(SLEEP_CLIP) {
            clip.play(self.stage.config().fade_in_secs());
            self.current = Some(clip);
        }

        self.deep_sleep = true;
    }

    pub(crate) async fn exit(&mut self, to: CharacterState, _emotion: Emotion) {
        tracing::info!(%to, "Exiting sleep state");
        self.deep_sleep = false;
        stop_clip(&mut self.current, self.stage.config().fade_out_secs()).await;

        let wake = self
            .stage
            .clip(WAKE_UP_CLIP)
            .or_else(|| self.stage.clip(CATALOG_WAKE_UP_CLIP));
        if let Some(wake) = wake {
            self.stage.play_to_end(&wake).await;
        }
        self.stage
            .play_transition(CharacterState::Sleep, to, Emotion::Neutral)
            .await;
    }

    /// Any message wakes Owen into the react state
    pub(crate) fn handle_message(&mut self, _message: &str) -> MessageOutcome {
        if !self.deep_sleep {
            return MessageOutcome::default();
        }
        tracing::debug!("Waking up due to user message");
        MessageOutcome {
            emotion: Emotion::Neutral,
            request: Some(CharacterState::React),
        }
    }

    /// Whether Owen is fully asleep
    #[must_use]
    pub fn is_deep_sleep(&self) -> bool {
        self.deep_sleep
    }

    /// Clip currently playing
    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OwenConfig;
    use crate::states::test_support::stage_with;

    const CLIPS: [&str; 4] = [FALL_ASLEEP_CLIP, SLEEP_CLIP, WAKE_UP_CLIP, "sleep_2wait_T"];

    #[tokio::test(start_paused = true)]
    async fn test_enter_and_exit_sequence() {
        let (stage, mixer) = stage_with(&CLIPS, 0.0, OwenConfig::default());
        let mut sleep = SleepState::new(stage);

        sleep.enter(Some(CharacterState::Wait), Emotion::Neutral).await;
        assert!(sleep.is_deep_sleep());
        assert_eq!(sleep.current_clip().unwrap().name(), SLEEP_CLIP);

        sleep.exit(CharacterState::Wait, Emotion::Neutral).await;
        assert!(!sleep.is_deep_sleep());
        assert_eq!(
            mixer.played(),
            vec![FALL_ASLEEP_CLIP, SLEEP_CLIP, WAKE_UP_CLIP, "sleep_2wait_T"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wakes_with_catalog_clip() {
        let (stage, mixer) = stage_with(
            &[SLEEP_CLIP, "Owen_SleepWakeUp", "sleep_2wait_T"],
            0.0,
            OwenConfig::default(),
        );
        let mut sleep = SleepState::new(stage);
        sleep.enter(None, Emotion::Neutral).await;
        sleep.exit(CharacterState::Wait, Emotion::Neutral).await;

        assert_eq!(
            mixer.played(),
            vec![SLEEP_CLIP, "Owen_SleepWakeUp", "sleep_2wait_T"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_requests_react_only_when_asleep() {
        let (stage, _) = stage_with(&CLIPS, 0.0, OwenConfig::default());
        let mut sleep = SleepState::new(stage);
        assert_eq!(sleep.handle_message("hi").request, None);

        sleep.enter(None, Emotion::Neutral).await;
        assert_eq!(
            sleep.handle_message("hi").request,
            Some(CharacterState::React)
        );
    }
}
