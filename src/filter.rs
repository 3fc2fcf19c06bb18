use crate::model::Candidate;

/// Keeps the candidates whose year string equals `year`, in input order.
///
/// Without a target year there is no safe subset, so the result is empty.
pub fn filter_by_year(year: Option<i32>, candidates: &[Candidate]) -> Vec<Candidate> {
    let Some(year) = year else {
        return Vec::new();
    };
    let wanted = year.to_string();
    candidates
        .iter()
        .filter(|c| c.year == wanted)
        .cloned()
        .collect()
}
