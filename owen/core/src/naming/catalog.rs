//! Scheme Catalog
//!
//! Canonical animation name tables. Entry `i` of every table names the same
//! logical animation, so conversion between schemes is an index lookup.
//! The tables are fixed-size arrays, which keeps their lengths equal.

use super::{AnimationNames, Scheme};

/// Number of logical animations known to the catalog
pub const IDENTITY_COUNT: usize = 33;

const LEGACY: [&str; IDENTITY_COUNT] = [
    // wait
    "wait_idle_L",
    "wait_pickNose_Q",
    "wait_stretch_Q",
    "wait_yawn_Q",
    // react, neutral
    "react_idle_L",
    "react_acknowledge_T",
    "react_nod_T",
    "react_listening_L",
    // react, angry
    "react_angry_L",
    "react_an2frown_T",
    "react_an2grumble_Q",
    "react_an2type_T",
    // react, happy
    "react_happy_L",
    "react_hp2smile_T",
    "react_hp2bounce_Q",
    "react_hp2type_T",
    // react, sad
    "react_sad_L",
    "react_sd2sigh_T",
    "react_sd2slump_Q",
    "react_sd2type_T",
    // react, shocked
    "react_shocked_L",
    "react_sh2gasp_T",
    "react_sh2jump_Q",
    "react_sh2type_T",
    // type
    "type_idle_L",
    "type_fast_L",
    "type_slow_L",
    "type_thinking_L",
    "type2wait_T",
    // sleep
    "sleep_light_L",
    "sleep_deep_L",
    "sleep_dream_Q",
    "sleep2wake_T",
];

const ARTIST: [&str; IDENTITY_COUNT] = [
    "Owen_WaitIdle",
    "Owen_PickNose",
    "Owen_Stretch",
    "Owen_Yawn",
    "Owen_ReactIdle",
    "Owen_ReactAcknowledge",
    "Owen_ReactNod",
    "Owen_ReactListening",
    "Owen_ReactAngryIdle",
    "Owen_ReactAngryFrown",
    "Owen_ReactAngryGrumble",
    "Owen_ReactAngryToType",
    "Owen_ReactHappyIdle",
    "Owen_ReactHappySmile",
    "Owen_ReactHappyBounce",
    "Owen_ReactHappyToType",
    "Owen_ReactSadIdle",
    "Owen_ReactSadSigh",
    "Owen_ReactSadSlump",
    "Owen_ReactSadToType",
    "Owen_ReactShockedIdle",
    "Owen_ReactShockedGasp",
    "Owen_ReactShockedJump",
    "Owen_ReactShockedToType",
    "Owen_TypeIdle",
    "Owen_TypeFast",
    "Owen_TypeSlow",
    "Owen_TypeThinking",
    "Owen_TypeToWait",
    "Owen_SleepLight",
    "Owen_SleepDeep",
    "Owen_SleepDream",
    "Owen_SleepWakeUp",
];

const HIERARCHICAL: [&str; IDENTITY_COUNT] = [
    "owen.state.wait.idle.loop",
    "owen.quirk.wait.picknose",
    "owen.quirk.wait.stretch",
    "owen.quirk.wait.yawn",
    "owen.state.react.idle.loop",
    "owen.state.react.acknowledge.transition",
    "owen.state.react.nod.transition",
    "owen.state.react.listening.loop",
    "owen.state.react.angry.idle.loop",
    "owen.state.react.angry.frown.transition",
    "owen.quirk.react.angry.grumble",
    "owen.state.react.angry.totype.transition",
    "owen.state.react.happy.idle.loop",
    "owen.state.react.happy.smile.transition",
    "owen.quirk.react.happy.bounce",
    "owen.state.react.happy.totype.transition",
    "owen.state.react.sad.idle.loop",
    "owen.state.react.sad.sigh.transition",
    "owen.quirk.react.sad.slump",
    "owen.state.react.sad.totype.transition",
    "owen.state.react.shocked.idle.loop",
    "owen.state.react.shocked.gasp.transition",
    "owen.quirk.react.shocked.jump",
    "owen.state.react.shocked.totype.transition",
    "owen.state.type.idle.loop",
    "owen.state.type.fast.loop",
    "owen.state.type.slow.loop",
    "owen.state.type.thinking.loop",
    "owen.state.type.towait.transition",
    "owen.state.sleep.light.loop",
    "owen.state.sleep.deep.loop",
    "owen.quirk.sleep.dream",
    "owen.state.sleep.wakeup.transition",
];

const SEMANTIC: [&str; IDENTITY_COUNT] = [
    "OwenWaitIdleLoop",
    "OwenQuirkPickNose",
    "OwenQuirkStretch",
    "OwenQuirkYawn",
    "OwenReactIdleLoop",
    "OwenReactAcknowledgeTransition",
    "OwenReactNodTransition",
    "OwenReactListeningLoop",
    "OwenReactAngryIdleLoop",
    "OwenReactAngryFrownTransition",
    "OwenQuirkAngryGrumble",
    "OwenReactAngryToTypeTransition",
    "OwenReactHappyIdleLoop",
    "OwenReactHappySmileTransition",
    "OwenQuirkHappyBounce",
    "OwenReactHappyToTypeTransition",
    "OwenReactSadIdleLoop",
    "OwenReactSadSighTransition",
    "OwenQuirkSadSlump",
    "OwenReactSadToTypeTransition",
    "OwenReactShockedIdleLoop",
    "OwenReactShockedGaspTransition",
    "OwenQuirkShockedJump",
    "OwenReactShockedToTypeTransition",
    "OwenTypeIdleLoop",
    "OwenTypeFastLoop",
    "OwenTypeSlowLoop",
    "OwenTypeThinkingLoop",
    "OwenTypeToWaitTransition",
    "OwenSleepLightLoop",
    "OwenSleepDeepLoop",
    "OwenQuirkSleepDream",
    "OwenSleepWakeUpTransition",
];

/// Ordered name list for a scheme
#[must_use]
pub fn names(scheme: Scheme) -> &'static [&'static str] {
    match scheme {
        Scheme::Legacy => &LEGACY,
        Scheme::Artist => &ARTIST,
        Scheme::Hierarchical => &HIERARCHICAL,
        Scheme::Semantic => &SEMANTIC,
    }
}

/// All four spellings of the identity at `index`
#[must_use]
pub fn identity(index: usize) -> Option<AnimationNames> {
    Some(AnimationNames {
        legacy: (*LEGACY.get(index)?).to_string(),
        artist: (*ARTIST.get(index)?).to_string(),
        hierarchical: (*HIERARCHICAL.get(index)?).to_string(),
        semantic: (*SEMANTIC.get(index)?).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_are_non_empty_and_distinct_per_scheme() {
        for scheme in Scheme::ALL {
            let list = names(scheme);
            assert_eq!(list.len(), IDENTITY_COUNT);
            assert!(list.iter().all(|n| !n.is_empty()), "{scheme} has an empty name");

            let distinct: HashSet<_> = list.iter().collect();
            assert_eq!(distinct.len(), list.len(), "{scheme} has duplicate names");
        }
    }

    #[test]
    fn test_identity_alignment() {
        let idle = identity(0).unwrap();
        assert_eq!(idle.legacy, "wait_idle_L");
        assert_eq!(idle.artist, "Owen_WaitIdle");
        assert_eq!(idle.hierarchical, "owen.state.wait.idle.loop");
        assert_eq!(idle.semantic, "OwenWaitIdleLoop");

        let angry = identity(8).unwrap();
        assert_eq!(angry.legacy, "react_angry_L");
        assert_eq!(angry.semantic, "OwenReactAngryIdleLoop");
    }

    #[test]
    fn test_identity_out_of_range() {
        assert!(identity(IDENTITY_COUNT).is_none());
    }
}
