//! Copy-on-write parse states, beam branching, and end-of-input fix-up.

mod common;

use common::{global, sentence};
use ramo::{Context, FeatureConfig, ParseState, PredicateIndex};
use std::rc::Rc;

fn parse_state(
    tokens: &[(&str, &str)],
    config: FeatureConfig,
    index: PredicateIndex,
) -> Rc<ParseState> {
    Rc::new(ParseState::new(
        &sentence(tokens, &[]),
        global(config),
        Rc::new(index),
    ))
}

#[test]
fn transition_returns_a_successor_and_never_mutates_the_receiver() {
    let state = parse_state(
        &[("a", "NN"), ("b", "NN"), ("c", "NN")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    let s1 = ParseState::transition(&state, g.actions.shift()).unwrap();

    let stack_before: Vec<_> = s1.state().stack().to_vec();
    let input_before: Vec<_> = s1.state().input().to_vec();
    let heads_before: Vec<_> = (1..=3).map(|id| s1.state().node(id).head).collect();

    let right = g.actions.intern("Rdet");
    let s2 = ParseState::transition(&s1, right).unwrap();

    // The successor carries the new arc; the receiver is untouched.
    assert_eq!(s2.state().node(1).head, 2);
    assert_eq!(s1.state().stack(), stack_before.as_slice());
    assert_eq!(s1.state().input(), input_before.as_slice());
    let heads_after: Vec<_> = (1..=3).map(|id| s1.state().node(id).head).collect();
    assert_eq!(heads_after, heads_before);
    assert_eq!(s2.state().action(), Some(right));
}

#[test]
fn beam_branches_diverge_independently() {
    let state = parse_state(
        &[("a", "NN"), ("b", "NN"), ("c", "NN")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    let base = ParseState::transition(&state, g.actions.shift()).unwrap();

    let reduced = ParseState::transition(&base, g.actions.intern("Rx")).unwrap();
    let shifted = ParseState::transition(&base, g.actions.shift()).unwrap();

    assert_eq!(reduced.state().node(1).head, 2);
    assert_eq!(shifted.state().node(1).head, 0);
    assert_eq!(base.state().node(1).head, 0);
    assert_eq!(shifted.state().stack(), &[0, 1, 2]);
    assert_eq!(reduced.state().stack(), &[0]);
}

#[test]
fn impossible_actions_yield_no_successor() {
    let state = parse_state(
        &[("a", "NN")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    assert!(ParseState::transition(&state, g.actions.unshift()).is_none());
    assert!(ParseState::transition(&state, g.actions.pop()).is_none());
}

#[test]
fn predecessor_chain_ends_at_the_initial_state() {
    let state = parse_state(
        &[("a", "NN"), ("b", "NN"), ("c", "NN")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    let mut current = Rc::clone(&state);
    for name in ["S", "S", "Rx", "S"] {
        current = ParseState::transition(&current, g.actions.intern(name)).unwrap();
    }
    let mut depth = 0;
    let mut walk = current;
    while let Some(prev) = walk.previous() {
        depth += 1;
        walk = Rc::clone(prev);
    }
    assert_eq!(depth, 4);
    assert!(walk.state().action().is_none());
    assert_eq!(walk.state().stack(), &[0]);
}

#[test]
fn punctuation_rewrites_shift_to_insert_while_extracted() {
    let state = parse_state(
        &[("a", "NN"), ("b", "NN"), ("c", "NN"), ("d", "NN"), (",", ",")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    let mut current = Rc::clone(&state);
    for _ in 0..3 {
        current = ParseState::transition(&current, g.actions.shift()).unwrap();
    }
    current = ParseState::transition(&current, g.actions.extract()).unwrap();
    assert_eq!(current.state().extracted(), &[2]);
    // Next token is punctuation: the shift becomes an insert.
    let next = ParseState::transition(&current, g.actions.shift()).unwrap();
    assert_eq!(next.state().action(), Some(g.actions.insert()));
    assert!(next.state().extracted().is_empty());
    assert_eq!(next.state().input(), &[5, 2]);
}

#[test]
fn context_maps_predicates_with_unknown_fallback() {
    let config = FeatureConfig::from_toml_str(r#"Features = ["FORM 0", "POS 0"]"#).unwrap();
    let mut index = PredicateIndex::new();
    // POS of the next token is known; its form is only known as #UNKNOWN.
    let pos_id = index.insert("D0NN");
    let unknown_id = index.insert("A0#UNKNOWN");
    index.insert("unrelated");
    let state = parse_state(&[("xylophone", "NN")], config, index);
    let Context { features, .. } = state.next();
    assert!(features.contains(&pos_id));
    assert!(features.contains(&unknown_id));
}

#[test]
fn unknown_predicates_without_fallback_are_dropped() {
    let config = FeatureConfig::from_toml_str(r#"Features = ["FORM 0"]"#).unwrap();
    let state = parse_state(&[("word", "NN")], config, PredicateIndex::new());
    let context = state.next();
    assert!(context.features.is_empty());
}

#[test]
fn split_feature_rides_on_the_context() {
    let config = FeatureConfig::from_toml_str(r#"SplitFeature = "POS 0""#).unwrap();
    let state = parse_state(&[("dog", "NN")], config, PredicateIndex::new());
    let context = state.next();
    assert_eq!(context.split.as_deref(), Some("NN"));
}

#[test]
fn stray_roots_are_attached_to_the_largest_root_candidate() {
    let state = parse_state(
        &[("x", "NN"), ("v", "VBZ"), ("w", "VBZ")],
        FeatureConfig::default(),
        PredicateIndex::new(),
    );
    let g = state.state().global().clone();
    let mut current = Rc::clone(&state);
    // Attach x under v, then shift both verbs: two unattached roots.
    current = ParseState::transition(&current, g.actions.shift()).unwrap();
    current = ParseState::transition(&current, g.actions.intern("Rdep")).unwrap();
    current = ParseState::transition(&current, g.actions.shift()).unwrap();
    current = ParseState::transition(&current, g.actions.shift()).unwrap();
    assert_eq!(current.state().stack(), &[0, 2, 3]);

    let mut finished = Rc::try_unwrap(current).expect("leaf state is unshared");
    assert!(!finished.has_next());
    // v owns the larger subtree: w is attached to it with the root label.
    assert_eq!(finished.state().node(3).head, 2);
    assert_eq!(finished.state().node(3).label, "ROOT");
    assert_eq!(finished.state().node(2).head, 0);
    assert_eq!(finished.state().node(2).label, "ROOT");
}

#[test]
fn multiple_roots_stay_detached_without_single_root() {
    let config = FeatureConfig::from_toml_str("SingleRoot = false").unwrap();
    let state = parse_state(&[("v", "VBZ"), ("w", "VBZ"), ("u", "VBZ")], config, PredicateIndex::new());
    let g = state.state().global().clone();
    let mut current = Rc::clone(&state);
    for _ in 0..3 {
        current = ParseState::transition(&current, g.actions.shift()).unwrap();
    }
    let mut finished = Rc::try_unwrap(current).expect("leaf state is unshared");
    assert!(!finished.has_next());
    // Stanford-dependencies style: labeled but left unattached.
    assert_eq!(finished.state().node(2).head, 0);
    assert_eq!(finished.state().node(2).label, "ROOT");
    assert_eq!(finished.state().node(3).head, 0);
    assert_eq!(finished.state().node(3).label, "ROOT");
}

#[test]
fn dropping_a_long_chain_releases_it_iteratively() {
    let n = 64;
    let tokens: Vec<(String, &str)> = (0..n).map(|i| (format!("w{i}"), "NN")).collect();
    let token_refs: Vec<(&str, &str)> = tokens.iter().map(|(f, p)| (f.as_str(), *p)).collect();
    let state = Rc::new(ParseState::new(
        &sentence(&token_refs, &[]),
        global(FeatureConfig::default()),
        Rc::new(PredicateIndex::new()),
    ));
    let g = state.state().global().clone();
    let mut current = Rc::clone(&state);
    loop {
        match ParseState::transition(&current, g.actions.shift()) {
            Some(next) if next.state().has_next() => current = next,
            _ => break,
        }
    }
    drop(current);
    // Only the handle we kept is left alive.
    assert_eq!(Rc::strong_count(&state), 1);
}
