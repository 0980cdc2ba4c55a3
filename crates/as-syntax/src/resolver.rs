//! Static conflict resolution over a plan library.
//!
//! Every descriptor of every plan is matched against the library and each
//! match registers both plan ids in each other's runtime registry.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::conflict::ConflictKind;
use crate::plan::Plan;

/// Outcome of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Number of plans inspected
    pub checked: usize,
    /// Conflicting id pairs, each ordered and listed once
    pub conflicts: Vec<(String, String)>,
}

impl ResolutionReport {
    pub fn involves(&self, id: &str) -> bool {
        self.conflicts.iter().any(|(a, b)| a == id || b == id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve descriptors into registry entries.
    ///
    /// Every plan gets an allocated registry, so afterwards
    /// `has_conflicting_plans` is false only for plans nothing conflicts with.
    pub fn resolve(&self, plans: &mut [Plan]) -> ResolutionReport {
        let ids: Vec<String> = plans.iter().map(Plan::id).collect();
        let pairs = self.matching_pairs(plans);

        for plan in plans.iter_mut() {
            plan.init_conflicting_plans();
        }
        let mut conflicts = BTreeSet::new();
        for &(a, b) in &pairs {
            plans[a].register_conflicting_plan(ids[b].clone());
            plans[b].register_conflicting_plan(ids[a].clone());
            let (x, y) = if ids[a] <= ids[b] {
                (&ids[a], &ids[b])
            } else {
                (&ids[b], &ids[a])
            };
            conflicts.insert((x.clone(), y.clone()));
        }

        tracing::debug!(plans = plans.len(), conflicts = conflicts.len(), "Resolved conflict sets");
        ResolutionReport {
            checked: plans.len(),
            conflicts: conflicts.into_iter().collect(),
        }
    }

    fn matching_pairs(&self, plans: &[Plan]) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        let mut add = |i: usize, j: usize| {
            pairs.insert((i.min(j), i.max(j)));
        };

        for (i, plan) in plans.iter().enumerate() {
            for descriptor in plan.conflicts() {
                match descriptor.kind() {
                    ConflictKind::Atomic => add(i, i),
                    ConflictKind::PlanName => {
                        for (j, other) in plans.iter().enumerate() {
                            if other.label().is_some_and(|l| l.functor == descriptor.key()) {
                                add(i, j);
                            }
                        }
                    }
                    ConflictKind::Identifier => {
                        for (j, other) in plans.iter().enumerate() {
                            if j != i && other.contains_conflict(descriptor) {
                                add(i, j);
                            }
                        }
                    }
                    ConflictKind::TriggerPattern => match descriptor.trigger_pattern() {
                        Some(Ok(pattern)) => {
                            for (j, other) in plans.iter().enumerate() {
                                if other.is_relevant(&pattern).is_some() {
                                    add(i, j);
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(plan = %plan.id(), error = %e, "Skipping trigger pattern");
                        }
                        None => {}
                    },
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_plans;

    fn resolve(source: &str) -> (Vec<Plan>, ResolutionReport) {
        let mut plans = parse_plans(source).unwrap();
        let report = ConflictResolver::new().resolve(&mut plans);
        (plans, report)
    }

    #[test]
    fn test_plan_name_is_symmetric() {
        let (plans, report) = resolve(
            r#"
            @p1[conflict("@p2")] +!a <- x.
            @p2 +!b <- y.
            @p3 +!c <- z.
            "#,
        );
        assert!(plans[0].conflicts_with("p2"));
        assert!(plans[1].conflicts_with("p1"));
        assert!(!plans[2].has_conflicting_plans());
        assert_eq!(report.checked, 3);
        assert_eq!(report.conflicts, vec![("p1".to_string(), "p2".to_string())]);
    }

    #[test]
    fn test_trigger_pattern_uses_relevance() {
        let (plans, _) = resolve(
            r#"
            @guard[conflict("+!move(X)")] +!guard <- wait.
            @m1 +!move(north) <- step.
            @m2 +!jump <- hop.
            "#,
        );
        assert!(plans[0].conflicts_with("m1"));
        assert!(!plans[0].conflicts_with("m2"));
    }

    #[test]
    fn test_shared_identifier() {
        let (plans, report) = resolve(
            r#"
            @a[conflict(arm)] +!grab <- g.
            @b[conflict(arm)] +!drop <- d.
            @c[conflict(leg)] +!walk <- w.
            "#,
        );
        assert!(plans[0].conflicts_with("b"));
        assert!(plans[1].conflicts_with("a"));
        assert!(!plans[2].has_conflicting_plans());
        assert!(!report.involves("c"));
    }

    #[test]
    fn test_atomic_conflicts_with_itself() {
        let (plans, report) = resolve("@solo[atomic] +!g <- a.");
        assert!(plans[0].conflicts_with("solo"));
        assert_eq!(report.conflicts, vec![("solo".to_string(), "solo".to_string())]);
    }

    #[test]
    fn test_bad_pattern_is_skipped() {
        let (plans, report) = resolve(r#"@p[conflict("+!")] +!g <- a."#);
        assert!(!plans[0].has_conflicting_plans());
        assert!(report.conflicts.is_empty());
    }
}
