//! Compiled feature templates
//!
//! A feature template names a token attribute and a path that walks the
//! partial dependency tree from an anchor in the stack or the input.
//! Template text is a whitespace-separated list of `ATTRIBUTE PATH` pairs;
//! a path is a signed anchor offset followed by optional direction codes:
//!
//! ```text
//! POS 0        part of speech of the next input token
//! LEMMA -1     lemma of the stack top
//! FORM 1lh     form of the head of the leftmost child of input[1]
//! POS -1 POS 0 compound predicate over stack top and next token
//! ```
//!
//! Negative anchors count from the stack top (`-1` = top); non-negative
//! anchors count from the next input token (`0` = next).

use crate::error::{Error, Result};

/// Direction codes recognized in a path, in the order used when checking
/// whether a predicate starts with a path prefix.
pub const DIR_CODES: &str = "hlrpn";

/// Attribute names with a fixed feature-type letter (`'A'` + index).
pub const FEATURE_ATTRIBUTES: &[&str] =
    &["FORM", "LEMMA", "CPOS", "POS", "FEATS", "DEPREL", "ENTITY"];

/// Index of `name` in the fixed attribute table.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_ATTRIBUTES.iter().position(|a| *a == name)
}

/// One step of a token path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Move to the assigned head.
    Head,
    /// Move to a left child (which end depends on `ClosestChildren`).
    LeftChild,
    /// Move to a right child (which end depends on `ClosestChildren`).
    RightChild,
    /// Move to the preceding sentence token.
    Prev,
    /// Move to the following sentence token.
    Next,
}

impl PathStep {
    /// The direction code letter for this step.
    pub fn code(self) -> char {
        match self {
            PathStep::Head => 'h',
            PathStep::LeftChild => 'l',
            PathStep::RightChild => 'r',
            PathStep::Prev => 'p',
            PathStep::Next => 'n',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c {
            'h' => Some(PathStep::Head),
            'l' => Some(PathStep::LeftChild),
            'r' => Some(PathStep::RightChild),
            'p' => Some(PathStep::Prev),
            'n' => Some(PathStep::Next),
            _ => None,
        }
    }
}

/// Anchor plus tree-walking steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPath {
    /// Anchor offset: negative = stack (from the top), non-negative =
    /// input (from the next token).
    pub root: i32,
    /// Steps walked from the anchor.
    pub steps: Vec<PathStep>,
}

impl TokenPath {
    /// Path code string (one letter per step, empty for a bare anchor).
    pub fn code(&self) -> String {
        self.steps.iter().map(|s| s.code()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for a bare anchor with no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A compiled template element: attribute plus path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Attribute to read at the path target.
    pub attribute: String,
    /// Path from anchor to target.
    pub path: TokenPath,
}

/// A chain of template elements whose values concatenate into a single
/// compound predicate.
pub type FeatureChain = Vec<FeatureSpec>;

fn template_error(template: &str, reason: impl Into<String>) -> Error {
    Error::Template {
        template: template.to_string(),
        reason: reason.into(),
    }
}

fn parse_path(template: &str, text: &str) -> Result<TokenPath> {
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (num, codes) = text.split_at(digits_end);
    let root: i32 = num
        .parse()
        .map_err(|_| template_error(template, format!("missing anchor offset in '{text}'")))?;
    let mut steps = Vec::new();
    for c in codes.chars() {
        let step = PathStep::from_code(c)
            .ok_or_else(|| template_error(template, format!("unknown direction code '{c}'")))?;
        steps.push(step);
    }
    Ok(TokenPath { root, steps })
}

fn parse_pairs(template: &str) -> Result<Vec<FeatureSpec>> {
    let words: Vec<&str> = template.split_whitespace().collect();
    if words.is_empty() {
        return Err(template_error(template, "empty template"));
    }
    if words.len() % 2 != 0 {
        return Err(template_error(
            template,
            "expected ATTRIBUTE PATH pairs",
        ));
    }
    let mut specs = Vec::with_capacity(words.len() / 2);
    for pair in words.chunks(2) {
        let attribute = pair[0];
        if feature_index(attribute).is_none() {
            return Err(Error::UnknownAttribute(attribute.to_string()));
        }
        specs.push(FeatureSpec {
            attribute: attribute.to_string(),
            path: parse_path(template, pair[1])?,
        });
    }
    Ok(specs)
}

/// Compiles a `Feature` entry: all pairs form one chained predicate.
pub fn compile_chain(template: &str) -> Result<FeatureChain> {
    parse_pairs(template)
}

/// Compiles a `Features` entry: every pair becomes its own chain.
pub fn compile_singles(template: &str) -> Result<Vec<FeatureChain>> {
    Ok(parse_pairs(template)?.into_iter().map(|s| vec![s]).collect())
}

/// Compiles a `SplitFeature` entry: exactly one pair.
pub fn compile_split(template: &str) -> Result<FeatureSpec> {
    let mut specs = parse_pairs(template)?;
    if specs.len() != 1 {
        return Err(template_error(template, "split feature takes one pair"));
    }
    Ok(specs.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_anchor() {
        let chain = compile_chain("POS -1").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].attribute, "POS");
        assert_eq!(chain[0].path.root, -1);
        assert!(chain[0].path.is_empty());
    }

    #[test]
    fn parses_steps_after_anchor() {
        let chain = compile_chain("FORM 1lh").unwrap();
        assert_eq!(chain[0].path.root, 1);
        assert_eq!(
            chain[0].path.steps,
            vec![PathStep::LeftChild, PathStep::Head]
        );
        assert_eq!(chain[0].path.code(), "lh");
    }

    #[test]
    fn chains_keep_pairs_together_singles_split_them() {
        let chain = compile_chain("POS -1 POS 0").unwrap();
        assert_eq!(chain.len(), 2);
        let singles = compile_singles("POS -1 POS 0").unwrap();
        assert_eq!(singles.len(), 2);
        assert_eq!(singles[0].len(), 1);
    }

    #[test]
    fn rejects_unknown_attribute_and_bad_codes() {
        assert!(matches!(
            compile_chain("BOGUS 0"),
            Err(Error::UnknownAttribute(_))
        ));
        assert!(compile_chain("POS 0x").is_err());
        assert!(compile_chain("POS").is_err());
        assert!(compile_split("POS -1 POS 0").is_err());
    }

    #[test]
    fn attribute_table_indices_are_stable() {
        assert_eq!(feature_index("FORM"), Some(0));
        assert_eq!(feature_index("LEMMA"), Some(1));
        assert_eq!(feature_index("DEPREL"), Some(5));
        assert_eq!(feature_index("XXX"), None);
    }
}
