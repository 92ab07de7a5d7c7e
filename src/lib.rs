//! Core of a shift-reduce transition-based dependency parser.
//!
//! This crate provides the three tightly coupled pieces at the heart of a
//! transition-based parser:
//!
//! - the parser **configuration** and its transition engine ([`State`]),
//!   including a limited family of non-projective actions;
//! - the training **oracle** ([`TrainState`]) that derives gold action
//!   sequences from annotated trees;
//! - the **feature extractor** ([`State::predicates`]) that turns each
//!   configuration into a sparse predicate vector for an external
//!   classifier, plus the copy-on-write beam states ([`ParseState`]) that
//!   map predicates to classifier feature ids.
//!
//! Corpus I/O, the classifier itself, and the beam-search driver are
//! external collaborators: they consume [`Event`]s during training and
//! [`Context`]s during parsing.

#![warn(missing_docs)]

pub mod action;
pub mod classifier;
pub mod config;
pub mod error;
pub mod global;
pub mod language;
pub mod parse;
pub mod patterns;
pub mod predicates;
pub mod sentence;
pub mod state;
pub mod template;
pub mod token;
pub mod train;
pub mod types;

// Re-export key types
pub use action::{Action, ActionTable};
pub use classifier::PredicateIndex;
pub use config::FeatureConfig;
pub use error::{Error, Result};
pub use global::GlobalInfo;
pub use language::{GenericLanguage, Language};
pub use parse::{Context, ParseState};
pub use predicates::Predicates;
pub use sentence::{Sentence, SentenceInfo};
pub use state::State;
pub use template::{FeatureChain, FeatureSpec, PathStep, TokenPath};
pub use token::{Morpho, Token, TokenGraph};
pub use train::{Event, TrainState};
pub use types::TokenId;

/// Crate version, used as the default model file version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model file version whose history features used the legacy `A` prefix.
pub const LEGACY_HISTORY_VERSION: &str = "1.1.2";
