//! Parser and feature-extractor configuration
//!
//! Options are read from a TOML key/value file whose keys match the
//! historical option names (`ArcEager`, `CompositeActions`, `Feature`,
//! ...). Feature templates are compiled at load time; the resulting
//! [`FeatureConfig`] is immutable and is shared read-only behind an `Arc`.

use crate::error::{Error, Result};
use crate::template::{self, FeatureChain, FeatureSpec};
use crate::VERSION;
use serde::Deserialize;
use std::path::Path;

/// Raw option file as deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    #[serde(rename = "Feature")]
    feature: Vec<String>,
    #[serde(rename = "Features")]
    features: Vec<String>,
    #[serde(rename = "ArcEager")]
    arc_eager: bool,
    #[serde(rename = "SplitFeature")]
    split_feature: Option<String>,
    #[serde(rename = "ClosestChildren")]
    closest_children: bool,
    #[serde(rename = "PrepChildEntityType")]
    prep_child_entity_type: bool,
    #[serde(rename = "StackSize")]
    stack_size: bool,
    #[serde(rename = "InputSize")]
    input_size: bool,
    #[serde(rename = "InPunct")]
    in_punct: bool,
    #[serde(rename = "InQuotes")]
    in_quotes: bool,
    #[serde(rename = "VerbCount")]
    verb_count: bool,
    #[serde(rename = "UseChildPunct")]
    use_child_punct: bool,
    #[serde(rename = "PastActions")]
    past_actions: u32,
    #[serde(rename = "WordDistance")]
    word_distance: bool,
    #[serde(rename = "PunctCount")]
    punct_count: bool,
    #[serde(rename = "MorphoAgreement")]
    morpho_agreement: bool,
    #[serde(rename = "LexChildNonWord")]
    lex_child_non_word: bool,
    #[serde(rename = "SingleRoot")]
    single_root: bool,
    #[serde(rename = "CompositeActions")]
    composite_actions: bool,
    #[serde(rename = "SecondOrder")]
    second_order: bool,
    #[serde(rename = "RightToLeft")]
    right_to_left: bool,
    #[serde(rename = "UnambiguousFeatures")]
    unambiguous: bool,
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "LexCutoff")]
    lex_cutoff: u32,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            feature: Vec::new(),
            features: Vec::new(),
            arc_eager: false,
            split_feature: None,
            closest_children: false,
            prep_child_entity_type: false,
            stack_size: true,
            input_size: false,
            in_punct: false,
            in_quotes: false,
            verb_count: true,
            use_child_punct: true,
            past_actions: 1,
            word_distance: true,
            punct_count: true,
            morpho_agreement: false,
            lex_child_non_word: true,
            single_root: true,
            composite_actions: true,
            second_order: false,
            right_to_left: false,
            unambiguous: true,
            version: VERSION.to_string(),
            lex_cutoff: 0,
        }
    }
}

/// Immutable parser/extractor configuration with compiled templates.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Compiled feature templates (chained entries first, then the
    /// single-element chains contributed by `Features`).
    pub templates: Vec<FeatureChain>,
    /// Template routing the configuration to one of several classifiers.
    pub split_feature: Option<FeatureSpec>,
    /// Enables the eager-style `L` variant and the `P` action.
    pub arc_eager: bool,
    /// Makes `l`/`r` paths select the child closest to the anchor.
    pub closest_children: bool,
    /// Enables the `1TIME`/`1LOC`/`TIME0`/`LOC0` features.
    pub prep_child_entity_type: bool,
    /// Enables the `((` feature.
    pub stack_size: bool,
    /// Enables the `))` feature.
    pub input_size: bool,
    /// Enables the punctuation-parity feature.
    pub in_punct: bool,
    /// Enables the in-quotes feature.
    pub in_quotes: bool,
    /// Enables the stack verb-count feature.
    pub verb_count: bool,
    /// Enables child-punctuation features for top and next.
    pub use_child_punct: bool,
    /// History depth of past-action features.
    pub past_actions: u32,
    /// Enables the focus-word distance feature.
    pub word_distance: bool,
    /// Enables the punctuation-count feature.
    pub punct_count: bool,
    /// Enables number/gender (dis)agreement features.
    pub morpho_agreement: bool,
    /// Annotates single-token chains with non-word children.
    pub lex_child_non_word: bool,
    /// Connects stray roots to a single chosen root at end of input.
    pub single_root: bool,
    /// Folds dependency labels into reduce action names.
    pub composite_actions: bool,
    /// Emits quadratic predicate-pair features.
    pub second_order: bool,
    /// Reverses sentences before parsing.
    pub right_to_left: bool,
    /// Puts the path code in front of the predicate value.
    pub unambiguous: bool,
    /// Model file version (history features used `A` before 1.1.2).
    pub version: String,
    /// Rare-feature pruning threshold used by the trainer.
    pub lex_cutoff: u32,
}

impl FeatureConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let mut templates = Vec::new();
        for entry in &raw.feature {
            templates.push(template::compile_chain(entry)?);
        }
        for entry in &raw.features {
            templates.extend(template::compile_singles(entry)?);
        }
        let split_feature = raw
            .split_feature
            .as_deref()
            .map(template::compile_split)
            .transpose()?;
        let config = Self {
            templates,
            split_feature,
            arc_eager: raw.arc_eager,
            closest_children: raw.closest_children,
            prep_child_entity_type: raw.prep_child_entity_type,
            stack_size: raw.stack_size,
            input_size: raw.input_size,
            in_punct: raw.in_punct,
            in_quotes: raw.in_quotes,
            verb_count: raw.verb_count,
            use_child_punct: raw.use_child_punct,
            past_actions: raw.past_actions,
            word_distance: raw.word_distance,
            punct_count: raw.punct_count,
            morpho_agreement: raw.morpho_agreement,
            lex_child_non_word: raw.lex_child_non_word,
            single_root: raw.single_root,
            composite_actions: raw.composite_actions,
            second_order: raw.second_order,
            right_to_left: raw.right_to_left,
            unambiguous: raw.unambiguous,
            version: raw.version,
            lex_cutoff: raw.lex_cutoff,
        };
        config.validate()?;
        Ok(config.normalized())
    }

    /// Exploiting the lexical cutoff during parsing requires the
    /// unambiguous predicate layout.
    fn normalized(mut self) -> Self {
        if self.lex_cutoff > 0 {
            self.unambiguous = true;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        for chain in &self.templates {
            if chain.is_empty() {
                return Err(Error::Configuration("empty feature chain".into()));
            }
        }
        Ok(())
    }

    /// True when the model was produced by the legacy line that used the
    /// `A` history prefix and per-token attribute indices.
    pub fn legacy_version(&self) -> bool {
        self.version == crate::LEGACY_HISTORY_VERSION
    }

    /// A typical projective-parsing template set, convenient for tests
    /// and quick experiments.
    pub fn baseline() -> Self {
        let text = r#"
Feature = ["POS -1 POS 0"]
Features = [
    "FORM -1", "FORM 0", "FORM 1",
    "LEMMA -1", "LEMMA 0",
    "POS -2", "POS -1", "POS 0", "POS 1", "POS 2",
    "DEPREL -1l", "DEPREL -1r", "DEPREL 0l",
]
"#;
        Self::from_toml_str(text).expect("baseline configuration must compile")
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default()).expect("default configuration must compile")
    }
}
