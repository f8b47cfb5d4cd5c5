use std::collections::HashSet;

use tracecook_types::Request;

const TOOL_DIFF_PENALTY: f64 = 0.5;
const RELATIVE_THRESHOLD: f64 = 0.5;

/// Write `parent_id` on every Request in `requests`, which must already be
/// sorted ascending by `timestamp`. Candidates are restricted to prior
/// Requests sharing the same `model`; the highest-scoring candidate wins,
/// provided it clears the forest threshold, otherwise the Request becomes
/// a new root.
pub fn assign_parents(requests: &mut [Request]) {
    for i in 1..requests.len() {
        let parent = find_parent(requests, i);
        requests[i].parent_id = parent;
    }
}

fn find_parent(requests: &[Request], i: usize) -> Option<String> {
    let model = &requests[i].model;
    let request_messages = &requests[i].request_messages;
    let tools: HashSet<&str> = requests[i].tools.iter().map(String::as_str).collect();

    let threshold = -RELATIVE_THRESHOLD * request_messages.len() as f64;

    let mut best_score = f64::NEG_INFINITY;
    let mut best_idx = None;

    // Iterate most-recent-first so a strict `>` comparison makes ties
    // favor the most recent candidate ("last turn wins").
    for c in (0..i).rev() {
        if requests[c].model != *model {
            continue;
        }
        let score = match_score(&requests[c], request_messages, &tools);
        if score > best_score {
            best_score = score;
            best_idx = Some(c);
        }
    }

    let idx = best_idx?;
    if best_score >= threshold {
        Some(requests[idx].id.clone())
    } else {
        None
    }
}

fn match_score(candidate: &Request, request_messages: &[String], tools: &HashSet<&str>) -> f64 {
    let expected: Vec<&str> = candidate
        .request_messages
        .iter()
        .chain(candidate.response_messages.iter())
        .map(String::as_str)
        .collect();
    let current: Vec<&str> = request_messages.iter().map(String::as_str).collect();

    let dist = levenshtein(&expected, &current);
    let candidate_tools: HashSet<&str> = candidate.tools.iter().map(String::as_str).collect();
    let sym_diff = candidate_tools.symmetric_difference(tools).count();

    -(dist as f64) - TOOL_DIFF_PENALTY * sym_diff as f64
}

/// Standard edit distance with unit insertion/deletion/substitution cost.
fn levenshtein(a: &[&str], b: &[&str]) -> usize {
    let (m, n) = (a.len(), b.len());
    let mut row: Vec<usize> = (0..=n).collect();

    for i in 1..=m {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=n {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = temp;
        }
    }
    row[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str, timestamp: i64, model: &str, request_messages: &[&str], response_messages: &[&str], tools: &[&str]) -> Request {
        Request {
            id: id.to_string(),
            parent_id: None,
            timestamp,
            request_messages: request_messages.iter().map(|s| s.to_string()).collect(),
            response_messages: response_messages.iter().map(|s| s.to_string()).collect(),
            model: model.to_string(),
            tools: tools.iter().map(|s| s.to_string()).collect(),
            duration_ms: 0,
        }
    }

    #[test]
    fn levenshtein_is_zero_for_identical_sequences() {
        assert_eq!(levenshtein(&["a", "b"], &["a", "b"]), 0);
    }

    #[test]
    fn levenshtein_counts_single_insertion() {
        assert_eq!(levenshtein(&["a"], &["a", "b"]), 1);
    }

    #[test]
    fn s2_second_turn_attaches_to_first() {
        let mut requests = vec![
            req("r1", 1, "gpt-4", &["m0"], &["m1"], &[]),
            req("r2", 2, "gpt-4", &["m0", "m1", "m2"], &["m3"], &[]),
        ];
        assign_parents(&mut requests);
        assert_eq!(requests[0].parent_id, None);
        assert_eq!(requests[1].parent_id.as_deref(), Some("r1"));
    }

    #[test]
    fn s5_forest_formation_on_large_edit_distance() {
        let mut requests = vec![
            req("r1", 1, "gpt-4", &["m0"], &["m1"], &[]),
            req("r2", 2, "gpt-4", &["m0", "m1", "m2"], &["m3"], &[]),
            req("r3", 3, "gpt-4", &["m9"], &[], &[]),
        ];
        assign_parents(&mut requests);
        assert_eq!(requests[2].parent_id, None);
    }

    #[test]
    fn s6_model_isolation_filters_candidates() {
        let mut requests = vec![
            req("r1", 1, "gpt-4", &["m0"], &["m1"], &[]),
            req("r2", 2, "gpt-3.5", &["m0"], &["m1"], &[]),
        ];
        assign_parents(&mut requests);
        assert_eq!(requests[1].parent_id, None);
    }

    #[test]
    fn ties_favor_the_most_recent_candidate() {
        let mut requests = vec![
            req("r1", 1, "gpt-4", &["m0"], &["m1"], &[]),
            req("r2", 2, "gpt-4", &["m0"], &["m1"], &[]),
            req("r3", 3, "gpt-4", &["m0", "m1", "x"], &[], &[]),
        ];
        assign_parents(&mut requests);
        assert_eq!(requests[2].parent_id.as_deref(), Some("r2"));
    }

    #[test]
    fn tool_set_mismatch_adds_penalty() {
        let mut requests = vec![
            req("r1", 1, "gpt-4", &["m0"], &["m1"], &["t0"]),
            req("r2", 2, "gpt-4", &["m0", "m1"], &[], &[]),
        ];
        assign_parents(&mut requests);
        // distance 0, tool symmetric diff 1 -> score -0.5, threshold -1.0: still accepted.
        assert_eq!(requests[1].parent_id.as_deref(), Some("r1"));
    }
}
