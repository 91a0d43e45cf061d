//! Subsequence fuzzy scoring
//!
//! `score` walks the target once, consuming the query as a case-insensitive
//! subsequence:
//!
//! - every matched character is worth 10
//! - a match directly after another match adds `5 * run`, where `run` is the
//!   length of the consecutive run including the current character
//! - a match at the start of the target or right after a space adds 20
//!
//! A query that is not fully consumed scores 0. Otherwise the total is
//! reduced by `2 * (target_len - query_len)` (in characters) and clamped at
//! 0, so shorter targets win ties.

const MATCH_POINTS: i64 = 10;
const RUN_POINTS: i64 = 5;
const WORD_START_POINTS: i64 = 20;
const LENGTH_PENALTY: i64 = 2;

/// Scores `target` against `query`; 0 means no match
pub fn score(query: &str, target: &str) -> u32 {
    let query: Vec<char> = query.chars().map(fold).collect();
    if query.is_empty() {
        return 0;
    }

    let mut total: i64 = 0;
    let mut next = 0;
    let mut run: i64 = 0;
    let mut prev_matched = false;
    let mut prev_char: Option<char> = None;
    let mut target_len: i64 = 0;

    for c in target.chars() {
        target_len += 1;

        let matched = next < query.len() && fold(c) == query[next];
        if matched {
            next += 1;
            total += MATCH_POINTS;

            if prev_matched {
                run += 1;
                total += RUN_POINTS * run;
            } else {
                run = 1;
            }

            if prev_char.is_none() || prev_char == Some(' ') {
                total += WORD_START_POINTS;
            }
        } else {
            run = 0;
        }

        prev_matched = matched;
        prev_char = Some(c);
    }

    if next < query.len() {
        return 0;
    }

    let penalty = LENGTH_PENALTY * (target_len - query.len() as i64);
    (total - penalty).clamp(0, u32::MAX as i64) as u32
}

/// Returns true if `query` is a case-insensitive subsequence of `target`
pub fn is_subsequence(query: &str, target: &str) -> bool {
    let mut wanted = query.chars().map(fold).peekable();
    for c in target.chars().map(fold) {
        if wanted.peek() == Some(&c) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}

/// Scores every candidate and returns `(index, score)` for the non-zero ones,
/// best first; equal scores keep their input order
pub fn rank<'a, I>(query: &str, candidates: I) -> Vec<(usize, u32)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<(usize, u32)> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| (i, score(query, candidate)))
        .filter(|(_, s)| *s > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
