//! Headless reference mixer
//!
//! A renderer-free [`Mixer`] that keeps just enough state to make the
//! animation state machine observable: per-action time, running flag, loop
//! mode and a linear fade weight. Every `play()` is appended to a log so
//! tests can assert clip ordering.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{ClipAction, ClipSource, LoopMode, Mixer};

/// Weight ramp in progress
#[derive(Clone, Copy, Debug, PartialEq)]
enum Fade {
    None,
    In { secs: f32 },
    Out { secs: f32 },
}

#[derive(Debug)]
struct ActionState {
    loop_mode: LoopMode,
    time: f32,
    running: bool,
    weight: f32,
    fade: Fade,
}

/// Action owned by a [`HeadlessMixer`]
#[derive(Debug)]
pub struct HeadlessAction {
    name: String,
    duration_secs: f32,
    state: Mutex<ActionState>,
    played: Arc<Mutex<Vec<String>>>,
}

impl HeadlessAction {
    fn new(source: &ClipSource, played: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: source.name.clone(),
            duration_secs: source.duration_secs.max(0.0),
            state: Mutex::new(ActionState {
                loop_mode: LoopMode::OnceClamp,
                time: 0.0,
                running: false,
                weight: 1.0,
                fade: Fade::None,
            }),
            played,
        }
    }

    /// Clip name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current playback position in seconds
    #[must_use]
    pub fn time(&self) -> f32 {
        self.state.lock().time
    }

    /// Current blend weight in `0.0..=1.0`
    #[must_use]
    pub fn weight(&self) -> f32 {
        self.state.lock().weight
    }

    /// Configured loop mode
    #[must_use]
    pub fn loop_mode(&self) -> LoopMode {
        self.state.lock().loop_mode
    }

    fn advance(&self, dt: f32) {
        let mut state = self.state.lock();
        if !state.running {
            return;
        }

        state.time += dt;
        if state.loop_mode == LoopMode::OnceClamp && state.time >= self.duration_secs {
            state.time = self.duration_secs;
            state.running = false;
        } else if state.loop_mode == LoopMode::Repeat && self.duration_secs > 0.0 {
            state.time %= self.duration_secs;
        }

        match state.fade {
            Fade::None => {}
            Fade::In { secs } => {
                state.weight = (state.weight + dt / secs).min(1.0);
                if state.weight >= 1.0 {
                    state.fade = Fade::None;
                }
            }
            Fade::Out { secs } => {
                state.weight = (state.weight - dt / secs).max(0.0);
                if state.weight <= 0.0 {
                    state.fade = Fade::None;
                    state.running = false;
                }
            }
        }
    }
}

impl ClipAction for HeadlessAction {
    fn set_loop(&self, mode: LoopMode) {
        self.state.lock().loop_mode = mode;
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.time = 0.0;
        state.weight = 1.0;
        state.fade = Fade::None;
    }

    fn fade_in(&self, secs: f32) {
        let mut state = self.state.lock();
        if secs > 0.0 {
            state.weight = 0.0;
            state.fade = Fade::In { secs };
        } else {
            state.weight = 1.0;
            state.fade = Fade::None;
        }
    }

    fn fade_out(&self, secs: f32) {
        let mut state = self.state.lock();
        if secs > 0.0 {
            state.fade = Fade::Out { secs };
        } else {
            state.weight = 0.0;
            state.fade = Fade::None;
            state.running = false;
        }
    }

    fn play(&self) {
        self.state.lock().running = true;
        self.played.lock().push(self.name.clone());
        tracing::trace!(clip = %self.name, "Headless action started");
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.running = false;
        state.time = 0.0;
        state.fade = Fade::None;
    }

    fn is_running(&self) -> bool {
        let state = self.state.lock();
        state.running
            && (state.loop_mode == LoopMode::Repeat || state.time < self.duration_secs)
    }
}

/// Renderer-free mixer used by tests and headless hosts
#[derive(Debug, Default)]
pub struct HeadlessMixer {
    actions: Mutex<HashMap<String, Arc<HeadlessAction>>>,
    played: Arc<Mutex<Vec<String>>>,
    elapsed: Mutex<f32>,
}

impl HeadlessMixer {
    /// Create an empty mixer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Action created for `name`, if any
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Arc<HeadlessAction>> {
        self.actions.lock().get(name).cloned()
    }

    /// Names of clips in the order `play()` was called on them
    #[must_use]
    pub fn played(&self) -> Vec<String> {
        self.played.lock().clone()
    }

    /// How many times `name` was played
    #[must_use]
    pub fn play_count(&self, name: &str) -> usize {
        self.played.lock().iter().filter(|n| *n == name).count()
    }

    /// Names of actions currently running
    #[must_use]
    pub fn running(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .actions
            .lock()
            .values()
            .filter(|a| a.is_running())
            .map(|a| a.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Total engine time advanced so far
    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        *self.elapsed.lock()
    }
}

impl Mixer for HeadlessMixer {
    fn clip_action(&self, source: &ClipSource) -> Arc<dyn ClipAction> {
        let mut actions = self.actions.lock();
        let action = actions
            .entry(source.name.clone())
            .or_insert_with(|| Arc::new(HeadlessAction::new(source, Arc::clone(&self.played))));
        Arc::clone(action) as Arc<dyn ClipAction>
    }

    fn advance(&self, delta_secs: f32) {
        if delta_secs <= 0.0 {
            return;
        }
        *self.elapsed.lock() += delta_secs;

        let actions: Vec<Arc<HeadlessAction>> = self.actions.lock().values().cloned().collect();
        for action in actions {
            action.advance(delta_secs);
        }
    }

    fn stop_all_action(&self) {
        for action in self.actions.lock().values() {
            action.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer_with(name: &str, secs: f32) -> (HeadlessMixer, Arc<dyn ClipAction>) {
        let mixer = HeadlessMixer::new();
        let action = mixer.clip_action(&ClipSource::new(name, secs));
        (mixer, action)
    }

    #[test]
    fn test_same_clip_returns_same_action() {
        let mixer = HeadlessMixer::new();
        let source = ClipSource::new("wait_idle_L", 1.0);
        let a = mixer.clip_action(&source);
        let b = mixer.clip_action(&source);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_once_clip_finishes_at_duration() {
        let (mixer, action) = mixer_with("wait_yawn_Q", 1.0);
        action.set_loop(LoopMode::OnceClamp);
        action.play();
        assert!(action.is_running());

        mixer.advance(0.5);
        assert!(action.is_running());

        mixer.advance(0.6);
        assert!(!action.is_running());
        assert!((mixer.action("wait_yawn_Q").unwrap().time() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_repeat_clip_keeps_running() {
        let (mixer, action) = mixer_with("wait_idle_L", 1.0);
        action.set_loop(LoopMode::Repeat);
        action.play();
        mixer.advance(5.25);
        assert!(action.is_running());
    }

    #[test]
    fn test_fade_out_ends_playback() {
        let (mixer, action) = mixer_with("wait_idle_L", 1.0);
        action.set_loop(LoopMode::Repeat);
        action.play();
        action.fade_out(0.2);
        mixer.advance(0.1);
        assert!(action.is_running());
        mixer.advance(0.15);
        assert!(!action.is_running());
    }

    #[test]
    fn test_fade_in_ramps_weight() {
        let (mixer, action) = mixer_with("wait_idle_L", 1.0);
        action.set_loop(LoopMode::Repeat);
        action.reset();
        action.fade_in(0.5);
        action.play();
        let headless = mixer.action("wait_idle_L").unwrap();
        assert!(headless.weight().abs() < f32::EPSILON);

        mixer.advance(0.25);
        assert!((headless.weight() - 0.5).abs() < 1e-4);

        mixer.advance(0.5);
        assert!((headless.weight() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_played_log_and_stop_all() {
        let mixer = HeadlessMixer::new();
        let idle = mixer.clip_action(&ClipSource::new("wait_idle_L", 1.0));
        let yawn = mixer.clip_action(&ClipSource::new("wait_yawn_Q", 1.0));
        idle.set_loop(LoopMode::Repeat);
        idle.play();
        yawn.play();
        assert_eq!(mixer.played(), vec!["wait_idle_L", "wait_yawn_Q"]);
        assert_eq!(mixer.running(), vec!["wait_idle_L", "wait_yawn_Q"]);

        mixer.stop_all_action();
        assert!(mixer.running().is_empty());
        assert_eq!(mixer.play_count("wait_idle_L"), 1);
    }
}
