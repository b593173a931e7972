// Match scoring: TF-IDF similarity against the resume's skill document,
// combined with a plain skill-overlap fraction.

pub mod scorer;
pub mod stop_words;
pub mod tfidf;

pub use scorer::{filter_matches, rank, score_postings, MatchSettings};
