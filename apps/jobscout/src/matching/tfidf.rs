//! TF-IDF vectorizer over word n-grams.
//!
//! Tokens are lowercase runs of two or more word characters. Stop words are
//! dropped before n-grams are built. The vocabulary keeps the `max_features`
//! most frequent terms corpus-wide (ties broken alphabetically), idf is
//! smoothed (`ln((1 + n) / (1 + df)) + 1`) and every row is L2-normalized.

use std::collections::{BTreeMap, HashMap};

use crate::matching::stop_words::is_stop_word;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Sparse row: term index → weight.
pub type SparseVector = BTreeMap<usize, f64>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    min_n: usize,
    max_n: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES, (1, 2))
    }
}

/// Output of `fit_transform`: one normalized row per input document.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: Vec<String>,
    pub rows: Vec<SparseVector>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        let min_n = ngram_range.0.max(1);
        Self {
            max_features,
            min_n,
            max_n: ngram_range.1.max(min_n),
        }
    }

    /// Learns the vocabulary and idf from `docs` and returns their weighted rows.
    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> TfidfMatrix {
        let term_counts: Vec<HashMap<String, usize>> = docs
            .iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for term in self.analyze(doc.as_ref()) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut corpus_count: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for (term, count) in counts {
                *corpus_count.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut candidates: Vec<(&str, usize)> = corpus_count.into_iter().collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(self.max_features);

        let mut vocabulary: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = term_counts
            .iter()
            .map(|counts| {
                let mut row: SparseVector = counts
                    .iter()
                    .filter_map(|(term, &tf)| {
                        index
                            .get(term.as_str())
                            .map(|&i| (i, tf as f64 * idf[i]))
                    })
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        TfidfMatrix { vocabulary, rows }
    }

    /// Tokenizes, drops stop words and expands into the configured n-grams.
    fn analyze(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<String> = tokenize(doc)
            .into_iter()
            .filter(|t| !is_stop_word(t))
            .collect();

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n {
            if tokens.len() < n {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

fn tokenize(doc: &str) -> Vec<String> {
    doc.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(String::from)
        .collect()
}

fn l2_normalize(row: &mut SparseVector) {
    let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.values_mut().for_each(|w| *w /= norm);
    }
}

/// Cosine similarity of two sparse vectors, clamped to [0, 1]. Zero vectors give 0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(i, w)| large.get(i).map(|v| w * v))
        .sum();
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
