//! Precedence merger
//!
//! Folds an ordered list of restrictions joined by pivot operators into a
//! single tree. AND binds tighter than OR: the result is an OR of maximal
//! runs of AND-joined terms.

use super::error::QueryError;
use super::restriction::{PivotOperator, Restriction};

/// Merge `k` components joined by `k - 1` pivots
pub fn merge(
    components: Vec<Restriction>,
    pivots: Vec<PivotOperator>,
) -> Result<Restriction, QueryError> {
    if components.len() != pivots.len() + 1 {
        return Err(QueryError::PivotCountMismatch {
            components: components.len(),
            pivots: pivots.len(),
        });
    }

    let mut components = components.into_iter();
    let Some(first) = components.next() else {
        return Err(QueryError::PivotCountMismatch {
            components: 0,
            pivots: pivots.len(),
        });
    };

    // Each entry is a run of AND-joined terms
    let mut runs: Vec<Restriction> = vec![first];
    for (pivot, next) in pivots.into_iter().zip(components) {
        match pivot {
            PivotOperator::And => {
                let Some(last) = runs.pop() else {
                    return Err(QueryError::Unexpected(
                        "empty run list while merging".to_string(),
                    ));
                };
                runs.push(Restriction::and(last, next));
            }
            PivotOperator::Or => runs.push(next),
        }
    }

    let mut runs = runs.into_iter();
    let Some(mut result) = runs.next() else {
        return Err(QueryError::Unexpected(
            "empty run list while merging".to_string(),
        ));
    };
    for run in runs {
        result = Restriction::or(result, run);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Restriction {
        Restriction::is_null(name)
    }

    #[test]
    fn test_single_component_unchanged() {
        let merged = merge(vec![leaf("a")], vec![]).unwrap();
        assert_eq!(merged, leaf("a"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a , b ; c  =>  a OR (b AND c)
        let merged = merge(
            vec![leaf("a"), leaf("b"), leaf("c")],
            vec![PivotOperator::Or, PivotOperator::And],
        )
        .unwrap();
        assert_eq!(
            merged,
            Restriction::or(leaf("a"), Restriction::and(leaf("b"), leaf("c")))
        );
    }

    #[test]
    fn test_leading_and_run() {
        // a ; b , c  =>  (a AND b) OR c
        let merged = merge(
            vec![leaf("a"), leaf("b"), leaf("c")],
            vec![PivotOperator::And, PivotOperator::Or],
        )
        .unwrap();
        assert_eq!(
            merged,
            Restriction::or(Restriction::and(leaf("a"), leaf("b")), leaf("c"))
        );
    }

    #[test]
    fn test_consecutive_ands_fold_left() {
        let merged = merge(
            vec![leaf("a"), leaf("b"), leaf("c")],
            vec![PivotOperator::And, PivotOperator::And],
        )
        .unwrap();
        assert_eq!(
            merged,
            Restriction::and(Restriction::and(leaf("a"), leaf("b")), leaf("c"))
        );
    }

    #[test]
    fn test_ors_fold_left() {
        let merged = merge(
            vec![leaf("a"), leaf("b"), leaf("c"), leaf("d")],
            vec![PivotOperator::Or, PivotOperator::And, PivotOperator::Or],
        )
        .unwrap();
        assert_eq!(
            merged,
            Restriction::or(
                Restriction::or(leaf("a"), Restriction::and(leaf("b"), leaf("c"))),
                leaf("d")
            )
        );
    }

    #[test]
    fn test_count_mismatch() {
        let err = merge(vec![leaf("a"), leaf("b")], vec![]).unwrap_err();
        assert_eq!(
            err,
            QueryError::PivotCountMismatch {
                components: 2,
                pivots: 0
            }
        );

        let err = merge(vec![], vec![]).unwrap_err();
        assert!(matches!(err, QueryError::PivotCountMismatch { .. }));
    }
}
