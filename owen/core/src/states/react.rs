//! React state: emotional response to a message

use std::sync::Arc;

use super::{stop_clip, CharacterState, MessageOutcome, Stage};
use crate::clip::Clip;
use crate::emotion::{classify_message, Emotion};

/// Handler for [`CharacterState::React`]
#[derive(Debug)]
pub struct ReactState {
    stage: Stage,
    current: Option<Arc<Clip>>,
    emotion: Emotion,
}

impl ReactState {
    /// Create the handler
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            current: None,
            emotion: Emotion::Neutral,
        }
    }

    pub(crate) async fn enter(&mut self, from: Option<CharacterState>, emotion: Emotion) {
        tracing::info!(from = ?from, %emotion, "Entering react state");
        self.emotion = emotion;

        if let Some(clip) = self.stage.clip("react_idle_L") {
            clip.play(self.stage.config().fade_in_secs());
            self.current = Some(clip);
        }
    }

    pub(crate) async fn exit(&mut self, to: CharacterState, emotion: Emotion) {
        tracing::info!(%to, %emotion, "Exiting react state");
        stop_clip(&mut self.current, self.stage.config().fade_out_secs()).await;

        let emotion = if emotion.is_neutral() {
            self.emotion
        } else {
            emotion
        };
        self.stage
            .play_transition(CharacterState::React, to, emotion)
            .await;
    }

    pub(crate) async fn handle_message(&mut self, message: &str) -> MessageOutcome {
        let emotion = classify_message(message);
        self.emotion = emotion;
        tracing::debug!(%emotion, "Message classified");

        if let Some(tag) = emotion.suffix() {
            let fade = self.stage.config().quirk_fade_secs();
            let reaction = self.stage.clip(&format!("react_{tag}_Q"));
            let idle = self.stage.clip(&format!("react_{tag}_L"));
            if let Some(reaction) = reaction {
                stop_clip(&mut self.current, fade).await;
                if !self.stage.play_to_end(&reaction).await {
                    reaction.halt();
                }
            } else if let Some(idle) = idle {
                stop_clip(&mut self.current, fade).await;
                idle.play(self.stage.config().fade_in_secs());
                self.current = Some(idle);
            } else {
                tracing::debug!(%emotion, "No emotional reaction clip available");
            }
        }

        MessageOutcome {
            emotion,
            request: None,
        }
    }

    /// Clip currently playing
    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        self.current.as_ref()
    }

    /// Emotion recorded by the last enter or message
    #[must_use]
    pub fn emotion(&self) -> Emotion {
        self.emotion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OwenConfig;
    use crate::states::test_support::stage_with;

    #[tokio::test(start_paused = true)]
    async fn test_happy_message_plays_quirk_to_end() {
        let (stage, mixer) = stage_with(
            &["react_idle_L", "react_happy_Q"],
            0.0,
            OwenConfig::default(),
        );
        let mut react = ReactState::new(stage);
        react.enter(Some(CharacterState::Wait), Emotion::Neutral).await;

        let outcome = react.handle_message("Hurry, please").await;
        assert_eq!(outcome.emotion, Emotion::Angry);
        assert_eq!(react.emotion(), Emotion::Angry);
        assert_eq!(mixer.played(), vec!["react_idle_L"]);

        let outcome = react.handle_message("great work").await;
        assert_eq!(outcome.emotion, Emotion::Happy);
        assert_eq!(outcome.request, None);
        assert_eq!(mixer.played(), vec!["react_idle_L", "react_happy_Q"]);
        assert!(react.current_clip().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_emotional_loop() {
        let (stage, mixer) = stage_with(
            &["react_idle_L", "react_angry_L"],
            1.0,
            OwenConfig::default(),
        );
        let mut react = ReactState::new(stage);
        react.enter(None, Emotion::Neutral).await;
        react.handle_message("hurry up").await;

        assert_eq!(react.current_clip().unwrap().name(), "react_angry_L");
        assert_eq!(mixer.played(), vec!["react_idle_L", "react_angry_L"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_neutral_message_keeps_idle() {
        let (stage, _) = stage_with(&["react_idle_L"], 1.0, OwenConfig::default());
        let mut react = ReactState::new(stage);
        react.enter(None, Emotion::Neutral).await;
        let outcome = react.handle_message("hello").await;

        assert_eq!(outcome, MessageOutcome::default());
        assert_eq!(react.current_clip().unwrap().name(), "react_idle_L");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_uses_recorded_emotion() {
        let (stage, mixer) = stage_with(
            &["react_idle_L", "react_sad2type_sad_T", "react_2type_T"],
            0.0,
            OwenConfig::default(),
        );
        let mut react = ReactState::new(stage);
        react.enter(None, Emotion::Neutral).await;
        react.handle_message("that went wrong").await;
        react.exit(CharacterState::Type, Emotion::Neutral).await;

        assert_eq!(mixer.played().last().unwrap(), "react_sad2type_sad_T");
    }
}
