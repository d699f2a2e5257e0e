//! Candidate selection for statement reconciliation.
//!
//! Storage narrows the ledger to candidates sharing the entry's date, an
//! amount within tolerance, and the import source's payment-mode tag; this
//! module picks at most one of them. Selection is deterministic for a given
//! candidate order.

/// A ledger transaction that already passed the date/amount/mode filter.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub id: i64,
    pub description: String,
}

/// Picks the candidate to reconcile against, if any.
///
/// One candidate is taken as-is. Among several, the first whose description
/// shares a word with the statement entry's description wins; with no word
/// overlap anywhere, the first candidate in query order is returned. That
/// fallback is a heuristic and can misfire on same-day, same-amount pairs.
pub fn select_candidate<'a>(
    entry_description: &str,
    candidates: &'a [MatchCandidate],
) -> Option<&'a MatchCandidate> {
    match candidates {
        [] => None,
        [only] => Some(only),
        _ => Some(
            candidates
                .iter()
                .find(|c| shares_word(entry_description, &c.description))
                .unwrap_or(&candidates[0]),
        ),
    }
}

/// Case-insensitive test for any whitespace-split word of the entry
/// description occurring in the candidate description.
fn shares_word(entry_description: &str, candidate_description: &str) -> bool {
    let candidate = candidate_description.to_lowercase();
    entry_description
        .split_whitespace()
        .map(str::to_lowercase)
        .any(|word| candidate.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, description: &str) -> MatchCandidate {
        MatchCandidate {
            id,
            description: description.to_string(),
        }
    }

    #[test]
    fn no_candidates_no_match() {
        assert!(select_candidate("UPI rent January", &[]).is_none());
    }

    #[test]
    fn single_candidate_wins_without_description_check() {
        let candidates = vec![candidate(7, "completely unrelated")];
        assert_eq!(
            select_candidate("UPI rent January", &candidates).unwrap().id,
            7
        );
    }

    #[test]
    fn word_overlap_beats_query_order() {
        let candidates = vec![
            candidate(1, "electricity bill"),
            candidate(2, "rent for office"),
        ];
        assert_eq!(
            select_candidate("UPI rent January", &candidates).unwrap().id,
            2
        );

        let reversed = vec![
            candidate(2, "rent for office"),
            candidate(1, "electricity bill"),
        ];
        assert_eq!(
            select_candidate("UPI rent January", &reversed).unwrap().id,
            2
        );
    }

    #[test]
    fn overlap_is_case_insensitive() {
        let candidates = vec![
            candidate(1, "misc expense"),
            candidate(2, "RENT settlement"),
        ];
        assert_eq!(
            select_candidate("upi rent transfer", &candidates).unwrap().id,
            2
        );
    }

    #[test]
    fn ambiguous_fallback_is_first_in_query_order() {
        let candidates = vec![
            candidate(10, "electricity bill"),
            candidate(11, "water charges"),
        ];
        assert_eq!(
            select_candidate("UPI/857491/transfer", &candidates).unwrap().id,
            10
        );
    }
}
