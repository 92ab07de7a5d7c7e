//! Shared type definitions and optimized collections

use crate::action::Action;
use smallvec::SmallVec;

/// Token identifier within a sentence.
///
/// Ids are 1-based; id 0 is reserved for the synthetic root node.
pub type TokenId = usize;

/// Optimized vector for the stack / input / extracted sequences.
/// Most sentences stay under 32 tokens.
pub type WorkVec = SmallVec<[TokenId; 32]>;

/// Optimized vector for per-node child lists.
/// Nodes rarely have more than 4 children on one side.
pub type ChildVec = SmallVec<[TokenId; 4]>;

/// Optimized vector for the rolling past-action window.
pub type PastVec = SmallVec<[Action; 4]>;

/// Bag of predicate strings emitted by the feature extractor.
pub type Features = Vec<String>;
