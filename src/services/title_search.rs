//! Fuzzy title matching
//!
//! Titles are scored with the Ratcliff/Obershelp ratio `2 * M / T`, where `M`
//! counts the characters in matching blocks and `T` is the combined length of
//! both strings. The comparison is case-sensitive and applies no
//! normalization, so an exact catalog title always scores 1.0 and a title
//! fragment such as "Blair Witch" still clears the default cutoff.
use crate::{db::Catalog, models::TitleMatch};

/// Minimum similarity for a title to count as a match
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Similarity ratio between two strings (0.0 to 1.0)
///
/// Two empty strings score 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Characters covered by matching blocks: the longest common run, then the
/// same search repeated on the pieces to its left and right
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common run within the given ranges as `(start_a, start_b, len)`
///
/// Ties go to the run starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
    // current[k + 1] is the length of the common run ending at a[i] and b[b_lo + k]
    let width = b_hi - b_lo + 1;
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let k = j - b_lo;
            current[k + 1] = if a[i] == b[j] { previous[k] + 1 } else { 0 };
            if current[k + 1] > best_size {
                best_size = current[k + 1];
                best_i = i + 1 - best_size;
                best_j = j + 1 - best_size;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    (best_i, best_j, best_size)
}

/// Returns up to `n` titles scoring at least `cutoff`, best first
///
/// Equal scores keep catalog order.
pub fn close_matches<'a, I>(query: &str, titles: I, n: usize, cutoff: f64) -> Vec<TitleMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, &str, f64)> = titles
        .into_iter()
        .enumerate()
        .map(|(index, title)| (index, title, similarity_ratio(query, title)))
        .filter(|(_, _, score)| *score >= cutoff)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.2.total_cmp(&a.2));
    scored.truncate(n);

    scored
        .into_iter()
        .map(|(index, title, score)| TitleMatch {
            index,
            title: title.to_string(),
            score,
        })
        .collect()
}

/// Best single match at or above `cutoff`, if any
pub fn find_closest_match<'a, I>(query: &str, titles: I, cutoff: f64) -> Option<TitleMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    close_matches(query, titles, 1, cutoff).into_iter().next()
}

/// Service function for the title search endpoint
pub fn search_titles(catalog: &Catalog, query: &str, limit: usize, cutoff: f64) -> Vec<TitleMatch> {
    let matches = close_matches(query, catalog.titles(), limit, cutoff);
    tracing::debug!(query, results = matches.len(), "Title search");
    matches
}
