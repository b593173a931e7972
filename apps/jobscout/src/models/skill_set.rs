use std::collections::BTreeSet;

use serde::Serialize;

/// Normalized, immutable set of skill strings derived from a resume.
///
/// Members are lowercase ASCII with collapsed whitespace. Iteration is
/// lexicographic, which keeps the synthetic skill document stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    /// Normalizes every raw candidate and keeps the ones that survive.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            raw.into_iter()
                .filter_map(|s| normalize_skill(s.as_ref()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The space-joined skill list, used as the synthetic corpus document.
    pub fn as_document(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Strips non-ASCII noise, folds case and collapses whitespace.
/// Returns `None` for empty or garbage tokens.
pub fn normalize_skill(raw: &str) -> Option<String> {
    let ascii: String = raw
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == ',' || c.is_ascii_control() { ' ' } else { c })
        .collect();

    let cleaned = ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if cleaned.len() < 2 || !cleaned.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(cleaned)
}
