//! "Did you mean" suggestions for unresolved command names.

use strsim::levenshtein;

/// Default maximum edit distance for a candidate to be suggested.
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// A candidate name and its edit distance from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub distance: usize,
}

/// Ranks candidate names by Levenshtein distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionEngine {
    max_distance: usize,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE)
    }
}

impl SuggestionEngine {
    pub fn new(max_distance: usize) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Returns candidates within the distance threshold, closest first.
    ///
    /// Candidates at the same distance keep their input order. An exact
    /// match is never suggested.
    pub fn suggest<'a, I>(&self, input: &str, candidates: I) -> Vec<Suggestion>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut suggestions: Vec<Suggestion> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let distance = levenshtein(input, candidate);
                (distance > 0 && distance <= self.max_distance).then(|| Suggestion {
                    name: candidate.to_string(),
                    distance,
                })
            })
            .collect();

        // sort_by_key is stable
        suggestions.sort_by_key(|s| s.distance);
        suggestions
    }
}
