//! Title similarity: longest common subsequence plus the fixed acceptance rule.
//!
//! Lengths are counted in `char`s. No case or whitespace folding happens here.

/// Share of the target that the common subsequence must cover.
pub const MIN_TARGET_COVERAGE: f64 = 0.8;
/// Share of the candidate that the common subsequence must cover.
pub const MIN_CANDIDATE_COVERAGE: f64 = 0.5;
/// The common subsequence must be strictly longer than this.
pub const MIN_COMMON_CHARS: usize = 6;

pub fn lcs_length(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ch_a in &a {
        for (j, &ch_b) in b.iter().enumerate() {
            curr[j + 1] = if ch_a == ch_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Decides whether `cand` names the same title as `target`, given their
/// common subsequence length.
pub fn is_same_title(target: &str, cand: &str, common: usize) -> bool {
    let target_len = target.chars().count() as f64;
    let cand_len = cand.chars().count() as f64;
    let common_f = common as f64;
    common_f >= MIN_TARGET_COVERAGE * target_len
        && common_f >= MIN_CANDIDATE_COVERAGE * cand_len
        && common > MIN_COMMON_CHARS
}

pub fn titles_match(target: &str, cand: &str) -> bool {
    is_same_title(target, cand, lcs_length(target, cand))
}
