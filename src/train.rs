//! Training oracle
//!
//! A [`TrainState`] replays an annotated sentence, deriving at each
//! configuration the gold action that the classifier should learn. The
//! caller drives the loop: `next()` yields the `(action, features)` event
//! for the current configuration, `transition()` applies the action in
//! place.

use crate::action::Action;
use crate::global::GlobalInfo;
use crate::sentence::Sentence;
use crate::state::State;
use crate::types::{Features, TokenId};
use std::sync::Arc;

/// A training event: the gold action paired with the feature vector of
/// the configuration it was decided in.
#[derive(Debug, Clone)]
pub struct Event {
    /// Gold action to learn.
    pub action: Action,
    /// Predicates extracted before the transition.
    pub features: Features,
}

#[derive(Debug, Clone)]
struct GoldArc {
    head: TokenId,
    label: String,
}

/// Parser state with the oracle that derives gold action sequences.
pub struct TrainState {
    state: State,
    /// Gold head/label per token id (after any sentence reversal).
    gold: Vec<GoldArc>,
    /// Remaining unattached dependents per token id.
    dependents: Vec<usize>,
}

impl TrainState {
    /// Creates a training state over an annotated sentence. The working
    /// copy has its dependencies cleared: even during training, only
    /// dependencies created by parsing may be observed by features.
    pub fn new(sentence: &Sentence, global: Arc<GlobalInfo>) -> Self {
        let mut state = State::new(sentence.clone(), global.clone());
        let gold: Vec<GoldArc> = state
            .sentence
            .nodes
            .iter()
            .map(|n| GoldArc {
                head: n.head,
                label: n.label.clone(),
            })
            .collect();
        let mut dependents = vec![0usize; gold.len()];
        for arc in &gold {
            if arc.head != 0 {
                dependents[arc.head - 1] += 1;
            }
        }
        if global.config.prep_child_entity_type {
            global.extract(&state.sentence);
        }
        for id in 1..=gold.len() {
            let node = state.node_mut(id);
            node.link_head(0);
            node.link_label("");
        }
        Self {
            state,
            gold,
            dependents,
        }
    }

    /// The underlying configuration.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// True while the input is non-empty.
    pub fn has_next(&self) -> bool {
        self.state.has_next()
    }

    /// Applies `action` in place. See [`State::transition`].
    pub fn transition(&mut self, action: Action) -> bool {
        self.state.transition(action)
    }

    /// Yields the training event for the current configuration, or `None`
    /// when the derivation is finished.
    pub fn next(&mut self) -> Option<Event> {
        let action = self.next_action()?;
        let features = self.state.predicates().features;
        Some(Event { action, features })
    }

    fn resolved(&self, id: TokenId) -> bool {
        id == 0 || self.dependents[id - 1] == 0
    }

    fn gold_head(&self, id: TokenId) -> TokenId {
        self.gold[id - 1].head
    }

    fn gold_label(&self, id: TokenId) -> &str {
        &self.gold[id - 1].label
    }

    /// True when the token `n` below the stack top has its gold head at
    /// the next input token.
    fn stack_headed_by_next(&self, n: usize, next: TokenId) -> bool {
        self.state.stack.len() > n
            && self.gold_head(self.state.stack[self.state.stack.len() - n]) == next
    }

    /// True when the gold head of the next token is the token `n` below
    /// the stack top.
    fn next_headed_by_stack(&self, n: usize, next_head: TokenId) -> bool {
        self.state.stack.len() > n
            && self.state.stack[self.state.stack.len() - n] == next_head
    }

    /// Determines the gold action for the current configuration.
    ///
    /// The rules are tried top to bottom; the first match fires. Reduce
    /// actions fire only once the reduced token has no unattached
    /// dependents left, otherwise the reduction is deferred with a shift.
    pub fn next_action(&mut self) -> Option<Action> {
        let global = self.state.global.clone();
        let composite = global.config.composite_actions;
        let actions = &global.actions;

        if self.state.input.is_empty() {
            if self.state.stack.len() > 1 {
                return Some(actions.unshift());
            }
            return None;
        }

        // Label the arc created by the previous reduce action.
        if !composite {
            if let Some(previous) = self.state.action {
                let name = actions.name(previous);
                let next = *self.state.input.last()?;
                match name.as_bytes()[0] {
                    b'R' | b'r' => {
                        let &child = self.state.node(next).left.last()?;
                        return Some(actions.reduce("D", self.gold_label(child), composite));
                    }
                    b'L' | b'l' => {
                        let &child = self.state.node(next).right.last()?;
                        return Some(actions.reduce("D", self.gold_label(child), composite));
                    }
                    _ => {}
                }
            }
        }

        if self.state.stack.is_empty() {
            // Cannot happen with the synthetic root in place.
            return Some(actions.shift());
        }

        let next = *self.state.input.last()?;
        let next_head = self.gold_head(next);
        let top = *self.state.stack.last()?;

        if self
            .state
            .extracted
            .last()
            .is_some_and(|&e| next_head == e)
        {
            // Bring back the last extracted token.
            return Some(actions.insert());
        }

        if top != 0 && self.gold_head(top) == next {
            // The stack top attaches to the next token.
            if !self.resolved(top) {
                return Some(actions.shift());
            }
            self.dependents[next - 1] = self.dependents[next - 1].saturating_sub(1);
            return Some(actions.reduce("R", &self.gold[top - 1].label, composite));
        }

        if global.config.arc_eager && self.state.stack.len() > 1 && self.resolved(top) {
            return Some(actions.pop());
        }

        if next_head == top && self.resolved(next) {
            // The next token attaches to the stack top (or to the root).
            if self.state.stack.len() > 1 {
                self.dependents[top - 1] = self.dependents[top - 1].saturating_sub(1);
            }
            return Some(actions.reduce("L", &self.gold[next - 1].label, composite));
        }

        for (n, base) in [(2usize, "r2"), (3, "r3")] {
            if self.stack_headed_by_next(n, next)
                && self.resolved(self.state.stack[self.state.stack.len() - n])
            {
                let nth = self.state.stack[self.state.stack.len() - n];
                self.dependents[next - 1] = self.dependents[next - 1].saturating_sub(1);
                return Some(actions.reduce(base, &self.gold[nth - 1].label, composite));
            }
        }
        // Depth 4 only at the last input token, to delay commitment.
        if self.state.input.len() == 1
            && self.stack_headed_by_next(4, next)
            && self.resolved(self.state.stack[self.state.stack.len() - 4])
        {
            let nth = self.state.stack[self.state.stack.len() - 4];
            self.dependents[next - 1] = self.dependents[next - 1].saturating_sub(1);
            return Some(actions.reduce("r4", &self.gold[nth - 1].label, composite));
        }

        if next_head == top && !self.resolved(next) {
            // The arc exists but the next token still collects dependents.
            return Some(actions.shift());
        }

        for (n, base) in [(2usize, "l2"), (3, "l3"), (4, "l4")] {
            if self.next_headed_by_stack(n, next_head) && self.resolved(next) {
                let nth = self.state.stack[self.state.stack.len() - n];
                if nth != 0 {
                    self.dependents[nth - 1] = self.dependents[nth - 1].saturating_sub(1);
                }
                return Some(actions.reduce(base, &self.gold[next - 1].label, composite));
            }
        }

        Some(actions.shift())
    }
}

impl std::fmt::Debug for TrainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainState")
            .field("state", &self.state)
            .field("dependents", &self.dependents)
            .finish()
    }
}
