//! Clip Abstraction
//!
//! A [`Clip`] pairs a named [`ClipSource`] with its parsed [`ClipMetadata`]
//! and, once bound, the mixer action that plays it. The [`ClipLibrary`] is
//! the factory and cache for clips; it lives as long as the animation
//! context that loaded it.
//!
//! # Binding
//!
//! ```text
//!   Clip ──create_action(mixer A)──▶ bound to A   (loop mode set from kind)
//!        ──create_action(mixer A)──▶ same action  (no-op)
//!        ──create_action(mixer B)──▶ ClipError::AlreadyBound
//! ```

pub mod metadata;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;

use crate::engine::{ClipAction, ClipSource, Mixer};
use crate::naming::{NameMapper, Scheme};
pub use metadata::{ClipKind, ClipMetadata, GrammarError};

/// Clip binding and parsing errors
#[derive(Debug, Error)]
pub enum ClipError {
    /// Clip already has an action on a different mixer
    #[error("Clip '{name}' is already bound to a different mixer")]
    AlreadyBound {
        /// Clip name
        name: String,
    },

    /// Clip name did not parse
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

struct Binding {
    mixer: Arc<dyn Mixer>,
    action: Arc<dyn ClipAction>,
}

/// A playable animation clip
pub struct Clip {
    name: String,
    source: ClipSource,
    metadata: ClipMetadata,
    binding: OnceLock<Binding>,
}

impl std::fmt::Debug for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

impl Clip {
    /// Create an unbound clip
    #[must_use]
    pub fn new(source: ClipSource, metadata: ClipMetadata) -> Self {
        Self {
            name: source.name.clone(),
            source,
            metadata,
            binding: OnceLock::new(),
        }
    }

    /// Clip name as loaded
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed metadata
    #[must_use]
    pub fn metadata(&self) -> &ClipMetadata {
        &self.metadata
    }

    /// Raw source data
    #[must_use]
    pub fn source(&self) -> &ClipSource {
        &self.source
    }

    /// Whether an action has been created
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }

    /// Bind this clip to `mixer`, returning its action.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::AlreadyBound`] if the clip is bound to another mixer.
    pub fn create_action(&self, mixer: &Arc<dyn Mixer>) -> Result<Arc<dyn ClipAction>, ClipError> {
        let binding = self.binding.get_or_init(|| {
            let action = mixer.clip_action(&self.source);
            action.set_loop(self.metadata.kind.loop_mode());
            Binding {
                mixer: Arc::clone(mixer),
                action,
            }
        });

        if same_mixer(&binding.mixer, mixer) {
            Ok(Arc::clone(&binding.action))
        } else {
            Err(ClipError::AlreadyBound {
                name: self.name.clone(),
            })
        }
    }

    /// Restart from the beginning with a fade-in
    pub fn play(&self, fade_in_secs: f32) {
        match self.binding.get() {
            Some(binding) => {
                binding.action.reset();
                binding.action.fade_in(fade_in_secs);
                binding.action.play();
                tracing::debug!(clip = %self.name, fade_in_secs, "Playing clip");
            }
            None => tracing::debug!(clip = %self.name, "Play ignored, clip is not bound"),
        }
    }

    /// Fade out and stop, returning once the fade has elapsed
    pub async fn stop(&self, fade_out_secs: f32) {
        let Some(binding) = self.binding.get() else {
            return;
        };
        binding.action.fade_out(fade_out_secs);
        let fade = Duration::try_from_secs_f32(fade_out_secs).unwrap_or(Duration::ZERO);
        if !fade.is_zero() {
            tokio::time::sleep(fade).await;
        }
        binding.action.stop();
        tracing::debug!(clip = %self.name, "Stopped clip");
    }

    /// Start fading out without waiting
    pub fn fade_out(&self, fade_out_secs: f32) {
        if let Some(binding) = self.binding.get() {
            binding.action.fade_out(fade_out_secs);
        }
    }

    /// Stop immediately
    pub fn halt(&self) {
        if let Some(binding) = self.binding.get() {
            binding.action.stop();
        }
    }

    /// Whether the engine still reports this clip running
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.binding
            .get()
            .is_some_and(|binding| binding.action.is_running())
    }

    /// Wait until the clip stops playing.
    ///
    /// Returns `false` if `timeout` elapsed first. Unbound clips count as
    /// finished.
    pub async fn wait_for_end(&self, poll: Duration, timeout: Duration) -> bool {
        let poll = poll.max(Duration::from_millis(1));
        let finished = tokio::time::timeout(timeout, async {
            while self.is_playing() {
                tokio::time::sleep(poll).await;
            }
        })
        .await;

        if finished.is_err() {
            tracing::warn!(
                clip = %self.name,
                ?timeout,
                "Timed out waiting for clip to finish"
            );
            return false;
        }
        true
    }
}

fn same_mixer(a: &Arc<dyn Mixer>, b: &Arc<dyn Mixer>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Anchored glob match where `*` matches any run of characters
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && p[pi] != '*' && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '*')
}

/// Parse metadata, reading catalog names of any scheme through their legacy spelling
#[must_use]
pub fn metadata_for(name: &str, mapper: &NameMapper) -> ClipMetadata {
    let legacy = match mapper.detect_scheme(name) {
        Some(scheme) if scheme != Scheme::Legacy => mapper
            .convert(name, Scheme::Legacy, Some(scheme))
            .unwrap_or_else(|_| name.to_string()),
        _ => name.to_string(),
    };

    ClipMetadata::parse(&legacy).unwrap_or_else(|e| {
        tracing::warn!(clip = %name, error = %e, "Clip name outside grammar, using opaque metadata");
        ClipMetadata::opaque(name)
    })
}

/// Factory and cache of clips for one animation context
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: RwLock<BTreeMap<String, Arc<Clip>>>,
}

impl ClipLibrary {
    /// Create an empty library
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or fetch the cached) clip for a source
    pub fn create_clip(&self, source: ClipSource, mapper: &NameMapper) -> Arc<Clip> {
        if let Some(existing) = self.get(&source.name) {
            return existing;
        }
        let metadata = metadata_for(&source.name, mapper);
        let clip = Arc::new(Clip::new(source, metadata));
        let mut clips = self.clips.write();
        Arc::clone(
            clips
                .entry(clip.name().to_string())
                .or_insert_with(|| Arc::clone(&clip)),
        )
    }

    /// Create clips for every source; returns the library size
    pub fn load(&self, sources: Vec<ClipSource>, mapper: &NameMapper) -> usize {
        for source in sources {
            self.create_clip(source, mapper);
        }
        let count = self.len();
        tracing::info!(clips = count, "Clip library loaded");
        count
    }

    /// Bind every clip to `mixer`
    ///
    /// # Errors
    ///
    /// Fails on the first clip already bound to a different mixer.
    pub fn bind_all(&self, mixer: &Arc<dyn Mixer>) -> Result<usize, ClipError> {
        let clips: Vec<Arc<Clip>> = self.clips.read().values().cloned().collect();
        for clip in &clips {
            clip.create_action(mixer)?;
        }
        Ok(clips.len())
    }

    /// Exact lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Clip>> {
        self.clips.read().get(name).cloned()
    }

    /// Case-insensitive exact lookup
    #[must_use]
    pub fn find_ignore_case(&self, name: &str) -> Option<Arc<Clip>> {
        self.clips
            .read()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, clip)| Arc::clone(clip))
    }

    /// Clips whose names match a `*` wildcard pattern, sorted by name
    #[must_use]
    pub fn by_pattern(&self, pattern: &str) -> Vec<Arc<Clip>> {
        self.clips
            .read()
            .iter()
            .filter(|(key, _)| wildcard_match(pattern, key))
            .map(|(_, clip)| Arc::clone(clip))
            .collect()
    }

    /// Clips whose parsed metadata satisfies `predicate`, sorted by name
    pub fn by_metadata<F>(&self, predicate: F) -> Vec<Arc<Clip>>
    where
        F: Fn(&ClipMetadata) -> bool,
    {
        self.clips
            .read()
            .values()
            .filter(|clip| predicate(clip.metadata()))
            .cloned()
            .collect()
    }

    /// Sorted clip names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.clips.read().keys().cloned().collect()
    }

    /// Number of clips
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.read().len()
    }

    /// Whether the library holds no clips
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.read().is_empty()
    }

    /// Stop every clip and drop them all
    pub fn clear(&self) {
        let clips = std::mem::take(&mut *self.clips.write());
        for clip in clips.values() {
            clip.halt();
        }
        tracing::debug!(clips = clips.len(), "Clip library cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessMixer;
    use crate::engine::LoopMode;

    fn library(names: &[&str]) -> ClipLibrary {
        let library = ClipLibrary::new();
        let mapper = NameMapper::new();
        library.load(
            names.iter().map(|n| ClipSource::new(*n, 1.0)).collect(),
            &mapper,
        );
        library
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("wait_*_Q", "wait_yawn_Q"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("react_*", "react_idle_L"));
        assert!(!wildcard_match("wait_*_Q", "wait_idle_L"));
        assert!(!wildcard_match("idle", "wait_idle_L"));
        assert!(wildcard_match("*idle*", "wait_idle_L"));
        assert!(wildcard_match("w*t_*_*", "wait_idle_L"));
    }

    #[test]
    fn test_by_metadata_reads_any_scheme() {
        let library = library(&["Owen_Yawn", "owen.quirk.wait.stretch", "Owen_WaitIdle", "react_idle_L"]);
        let names: Vec<String> = library
            .by_metadata(|m| m.state == "wait" && m.kind == ClipKind::Quirk)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Owen_Yawn", "owen.quirk.wait.stretch"]);
    }

    #[test]
    fn test_create_action_binds_once() {
        let clip = Clip::new(
            ClipSource::new("wait_idle_L", 1.0),
            ClipMetadata::parse("wait_idle_L").unwrap(),
        );
        let headless = Arc::new(HeadlessMixer::new());
        let mixer: Arc<dyn Mixer> = headless.clone();

        let first = clip.create_action(&mixer).unwrap();
        let second = clip.create_action(&mixer).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            headless.action("wait_idle_L").unwrap().loop_mode(),
            LoopMode::Repeat
        );

        let other: Arc<dyn Mixer> = Arc::new(HeadlessMixer::new());
        assert!(matches!(
            clip.create_action(&other),
            Err(ClipError::AlreadyBound { .. })
        ));
    }

    #[test]
    fn test_unbound_clip_is_inert() {
        let clip = Clip::new(
            ClipSource::new("wait_yawn_Q", 1.0),
            ClipMetadata::parse("wait_yawn_Q").unwrap(),
        );
        clip.play(0.3);
        clip.fade_out(0.3);
        clip.halt();
        assert!(!clip.is_playing());
        assert!(!clip.is_bound());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_waits_for_fade() {
        let library = library(&["wait_idle_L"]);
        let mixer: Arc<dyn Mixer> = Arc::new(HeadlessMixer::new());
        library.bind_all(&mixer).unwrap();

        let clip = library.get("wait_idle_L").unwrap();
        clip.play(0.0);
        assert!(clip.is_playing());

        let started = tokio::time::Instant::now();
        clip.stop(0.3).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(!clip.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_end_times_out_on_loops() {
        let library = library(&["wait_idle_L"]);
        let mixer: Arc<dyn Mixer> = Arc::new(HeadlessMixer::new());
        library.bind_all(&mixer).unwrap();

        let clip = library.get("wait_idle_L").unwrap();
        clip.play(0.0);
        let finished = clip
            .wait_for_end(Duration::from_millis(16), Duration::from_millis(500))
            .await;
        assert!(!finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_end_sees_completion() {
        let library = library(&["wait_yawn_Q"]);
        let headless = Arc::new(HeadlessMixer::new());
        let mixer: Arc<dyn Mixer> = headless.clone();
        library.bind_all(&mixer).unwrap();

        let clip = library.get("wait_yawn_Q").unwrap();
        clip.play(0.0);

        let driver = tokio::spawn(async move {
            for _ in 0..100 {
                headless.advance(0.05);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        let finished = clip
            .wait_for_end(Duration::from_millis(16), Duration::from_secs(10))
            .await;
        assert!(finished);
        driver.abort();
    }

    #[test]
    fn test_library_lookups() {
        let library = library(&["wait_idle_L", "wait_yawn_Q", "wait_stretch_Q", "react_idle_L"]);

        assert_eq!(library.len(), 4);
        assert!(library.get("wait_idle_L").is_some());
        assert!(library.get("WAIT_IDLE_L").is_none());
        assert_eq!(
            library.find_ignore_case("WAIT_IDLE_L").unwrap().name(),
            "wait_idle_L"
        );

        let quirks: Vec<String> = library
            .by_pattern("wait_*_Q")
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(quirks, vec!["wait_stretch_Q", "wait_yawn_Q"]);

        library.clear();
        assert!(library.is_empty());
    }

    #[test]
    fn test_metadata_for_other_schemes() {
        let mapper = NameMapper::new();

        let artist = metadata_for("Owen_ReactAngryIdle", &mapper);
        assert_eq!(artist.state, "react");
        assert_eq!(artist.kind, ClipKind::Loop);

        let semantic = metadata_for("OwenQuirkYawn", &mapper);
        assert_eq!(semantic.kind, ClipKind::Quirk);

        let unknown = metadata_for("Armature|Take001", &mapper);
        assert_eq!(unknown, ClipMetadata::opaque("Armature|Take001"));
    }

    #[test]
    fn test_create_clip_is_cached() {
        let library = ClipLibrary::new();
        let mapper = NameMapper::new();
        let a = library.create_clip(ClipSource::new("wait_idle_L", 1.0), &mapper);
        let b = library.create_clip(ClipSource::new("wait_idle_L", 2.0), &mapper);
        assert!(Arc::ptr_eq(&a, &b));
        assert!((b.source().duration_secs - 1.0).abs() < f32::EPSILON);
    }
}
