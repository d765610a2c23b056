//! Type state: Owen types a response

use std::sync::Arc;

use super::{stop_clip, CharacterState, Stage};
use crate::clip::Clip;
use crate::emotion::Emotion;

const IDLE_CLIP: &str = "type_idle_L";
const FINISH_CLIP: &str = "type_finish_Q";

/// Handler for [`CharacterState::Type`]
#[derive(Debug)]
pub struct TypeState {
    stage: Stage,
    current: Option<Arc<Clip>>,
    emotion: Emotion,
    typing: bool,
}

impl TypeState {
    /// Create the handler
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            current: None,
            emotion: Emotion::Neutral,
            typing: false,
        }
    }

    pub(crate) async fn enter(&mut self, from: Option<CharacterState>, emotion: Emotion) {
        tracing::info!(from = ?from, %emotion, "Entering type state");
        self.emotion = emotion;
        self.typing = true;

        let clip = emotion
            .suffix()
            .and_then(|tag| self.stage.clip(&format!("type_{tag}_L")))
            .or_else(|| self.stage.clip(IDLE_CLIP));
        if let Some(clip) = clip {
            clip.play(self.stage.config().fade_in_secs());
            self.current = Some(clip);
        }
    }

    pub(crate) async fn exit(&mut self, to: CharacterState, emotion: Emotion) {
        tracing::info!(%to, "Exiting type state");
        self.typing = false;
        stop_clip(&mut self.current, self.stage.config().fade_out_secs()).await;

        let emotion = if emotion.is_neutral() {
            self.emotion
        } else {
            emotion
        };
        self.stage
            .play_transition(CharacterState::Type, to, emotion)
            .await;
    }

    /// Play the finishing flourish (if any) and clear the typing flag
    pub async fn finish_typing(&mut self) {
        if !self.typing {
            return;
        }

        if let Some(finish) = self.stage.clip(FINISH_CLIP) {
            if self.current.is_some() {
                stop_clip(&mut self.current, self.stage.config().quirk_fade_secs()).await;
                self.stage.play_to_end(&finish).await;
            }
        }

        self.typing = false;
        tracing::debug!("Typing finished");
    }

    /// Whether Owen is mid-response
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Set the typing flag directly
    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    /// Clip currently playing
    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        self.current.as_ref()
    }

    /// Emotion the state was entered with
    #[must_use]
    pub fn emotion(&self) -> Emotion {
        self.emotion
    }
}
