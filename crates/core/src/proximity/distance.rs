use serde::Serialize;

/// How a candidate's text relates to the query. Declaration order is the
/// ranking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Exact,
    Prefix,
    Substring,
    Unrelated,
}

impl MatchClass {
    /// Classify `text` against `query`. Both must already be normalized.
    pub fn classify(text: &str, query: &str) -> Self {
        if text == query {
            Self::Exact
        } else if text.starts_with(query) {
            Self::Prefix
        } else if text.contains(query) {
            Self::Substring
        } else {
            Self::Unrelated
        }
    }
}

/// Trimmed, lower-cased form used for every comparison.
pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Levenshtein edit distance, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (curr_row[j] + 1) // insertion
                .min(prev_row[j + 1] + 1) // deletion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}
