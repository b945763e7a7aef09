//! String-similarity scoring
//!
//! Two interchangeable scorers rank candidate keys against a free-text
//! query. Both normalise their inputs the same way (non-alphanumerics become
//! spaces, then lower-case and trim) and report an integer score in
//! `0..=100`.

use serde::{Deserialize, Serialize};

/// Similarity function used to rank candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// Character-level normalised Levenshtein ratio
    #[default]
    Ratio,
    /// Ratio over sorted token intersections; insensitive to word order and
    /// to extra words on either side
    TokenSet,
}

impl Scorer {
    /// Returns a human-readable name for the scorer
    pub fn name(&self) -> &'static str {
        match self {
            Scorer::Ratio => "ratio",
            Scorer::TokenSet => "token set ratio",
        }
    }

    /// Normalise a string the way this scorer expects its inputs
    pub fn prepare(&self, s: &str) -> String {
        match self {
            Scorer::Ratio => full_process(s, false),
            Scorer::TokenSet => full_process(s, true),
        }
    }

    /// Score two strings that have already been through [`Scorer::prepare`]
    pub fn score_prepared(&self, query: &str, choice: &str) -> u8 {
        match self {
            Scorer::Ratio => ratio(query, choice),
            Scorer::TokenSet => token_set_ratio(query, choice),
        }
    }

    /// Score `choice` against `query`
    pub fn score(&self, query: &str, choice: &str) -> u8 {
        self.score_prepared(&self.prepare(query), &self.prepare(choice))
    }

    /// Score every choice against `query`, best first
    ///
    /// The sort is stable, so equal scores keep the order of `choices`.
    /// `limit` truncates the ranking; `None` returns every choice.
    pub fn extract_bests<'a, I>(&self, query: &str, choices: I, limit: Option<usize>) -> Vec<(&'a str, u8)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = self.prepare(query);
        let mut scored: Vec<(&'a str, u8)> = choices
            .into_iter()
            .map(|choice| (choice, self.score_prepared(&query, &self.prepare(choice))))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(limit) = limit {
            scored.truncate(limit);
        }
        scored
    }
}

/// Replace non-alphanumerics with spaces, lower-case and trim
///
/// With `force_ascii`, Latin-1 supplement characters are dropped first.
pub fn full_process(s: &str, force_ascii: bool) -> String {
    let processed: String = s
        .chars()
        .filter(|c| !(force_ascii && ('\u{80}'..='\u{ff}').contains(c)))
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    processed.trim().to_string()
}

/// Character similarity of two prepared strings
///
/// Normalised Levenshtein similarity scaled to `0..=100`, rounded half to
/// even.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (100.0 * strsim::normalized_levenshtein(a, b)).round_ties_even() as u8
}

/// Token-set similarity of two prepared strings
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut tokens_a: Vec<&str> = a.split_whitespace().collect();
    let mut tokens_b: Vec<&str> = b.split_whitespace().collect();
    tokens_a.sort_unstable();
    tokens_a.dedup();
    tokens_b.sort_unstable();
    tokens_b.dedup();

    let intersection: Vec<&str> = tokens_a
        .iter()
        .copied()
        .filter(|t| tokens_b.binary_search(t).is_ok())
        .collect();
    let only_a: Vec<&str> = tokens_a
        .iter()
        .copied()
        .filter(|t| intersection.binary_search(t).is_err())
        .collect();
    let only_b: Vec<&str> = tokens_b
        .iter()
        .copied()
        .filter(|t| intersection.binary_search(t).is_err())
        .collect();

    let sect = intersection.join(" ");
    let combined_a = format!("{} {}", sect, only_a.join(" ")).trim().to_string();
    let combined_b = format!("{} {}", sect, only_b.join(" ")).trim().to_string();

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}
