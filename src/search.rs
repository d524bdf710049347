//! Multi-word fuzzy matching, ranking and query debouncing.
//!
//! This is not prefix or edit-distance search: a candidate scores by how
//! tightly its words *contain* the typed words. Every query word must find
//! its own candidate word (each candidate word satisfies at most one query
//! word), and the score is the total padding around the typed words - lower
//! is tighter, the tightest-fitting candidates rank first.
//!
//! Query mutations never re-filter immediately. The query state records the
//! mutation time and the tick loop asks [`QueryState::take_due`] with the
//! injected clock's notion of "now"; filtering runs once per settled idle
//! window.

use crate::session::slot::DataBoundSlot;

// =============================================================================
// Scoring
// =============================================================================

/// Score a candidate's words against the query words.
///
/// For each query word, in order, the best still-unused candidate word
/// containing it is consumed, where best means the smallest length
/// difference. `None` rejects the candidate: some query word found no unused
/// containing word.
pub fn score_match(query_words: &[String], candidate_words: &[String]) -> Option<usize> {
    let mut consumed = vec![false; candidate_words.len()];
    let mut total_padding = 0;

    for query_word in query_words {
        let mut best: Option<(usize, usize)> = None; // (padding, index)

        for (index, candidate) in candidate_words.iter().enumerate() {
            if consumed[index] || !candidate.contains(query_word.as_str()) {
                continue;
            }

            let padding = candidate.len() - query_word.len();
            if best.is_none_or(|(best_padding, _)| padding < best_padding) {
                best = Some((padding, index));
            }
        }

        // All query words need a match.
        let (padding, index) = best?;
        consumed[index] = true;
        total_padding += padding;
    }

    Some(total_padding)
}

/// Split a query into normalized (lower-cased, whitespace-separated) words.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

// =============================================================================
// Filter modes
// =============================================================================

/// A cyclic filter-mode selector deciding which words of a data item are
/// searched through.
pub trait SearchFilter<T>: Copy + Eq + 'static {
    /// All modes, in cycling order.
    fn all() -> &'static [Self];

    fn name(&self) -> &'static str;

    /// Normalized (trimmed, lower-case) words to search through for one
    /// data item.
    fn words(&self, data: &T) -> Vec<String>;

    /// The next mode, wrapping around after the last one.
    fn next(&self) -> Self {
        let all = Self::all();
        let position = all.iter().position(|mode| mode == self).unwrap_or(0);
        all[(position + 1) % all.len()]
    }
}

/// Apply the filter algorithm to the full candidate list.
///
/// A blank query is the identity filter: every candidate in original order.
/// Otherwise candidates are scored via [`score_match`], rejects dropped, and
/// the survivors ranked ascending by score with the data's own ordering as
/// the tie break.
pub fn apply_filter<T, F>(filter: F, query: &str, candidates: &[DataBoundSlot<T>]) -> Vec<DataBoundSlot<T>>
where
    T: Clone + Ord,
    F: SearchFilter<T>,
{
    if query.trim().is_empty() {
        return candidates.to_vec();
    }

    let words = query_words(query);
    let mut scored: Vec<(usize, DataBoundSlot<T>)> = candidates
        .iter()
        .filter_map(|candidate| {
            score_match(&words, &filter.words(&candidate.data))
                .map(|score| (score, candidate.clone()))
        })
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_a.cmp(score_b).then_with(|| a.data.cmp(&b.data))
    });

    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

// =============================================================================
// Debounced query state
// =============================================================================

/// The current query plus the pending-refilter bookkeeping.
#[derive(Debug, Clone)]
pub struct QueryState {
    text: String,
    debounce_ms: u64,
    last_edit_ms: Option<u64>,
}

impl QueryState {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            text: String::new(),
            debounce_ms,
            last_edit_ms: None,
        }
    }

    /// The normalized (trimmed) query text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Store a new query and re-arm the debounce. Does not re-filter.
    pub fn set(&mut self, text: &str, now_ms: u64) {
        self.text = text.trim().to_string();
        self.last_edit_ms = Some(now_ms);
    }

    /// Re-arm the debounce without changing the text - the filter-mode
    /// cycle uses this so a mode change re-filters on the same idle window
    /// as a text change.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_edit_ms = Some(now_ms);
    }

    /// True once per armed debounce, as soon as the idle window has elapsed.
    /// Consuming the signal clears the pending state.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.last_edit_ms {
            Some(last) if now_ms.saturating_sub(last) >= self.debounce_ms => {
                self.last_edit_ms = None;
                true
            }
            _ => false,
        }
    }
}
