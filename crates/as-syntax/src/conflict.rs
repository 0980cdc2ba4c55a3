//! Conflict descriptors declared by `conflict(...)` label annotations.
//!
//! A descriptor names a class of plans that must not run concurrently with
//! the plan carrying it:
//!
//! | annotation term     | descriptor                 |
//! |---------------------|----------------------------|
//! | `foo`               | `Identifier("foo")`        |
//! | `"@p2"`             | `PlanName("p2")`           |
//! | `"+!move"`          | `TriggerPattern("+!move")` |
//! | `"bar"`             | `Identifier("bar")`        |
//! | `_`, `_Any`         | `Atomic("_")`              |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::term::Term;
use crate::trigger::Trigger;
use crate::{Result, SyntaxError};

/// Key used by the atomic descriptor
pub const ATOMIC_KEY: &str = "_";

/// What a descriptor's key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Plans whose trigger is relevant for the pattern
    TriggerPattern,
    /// The plan with this label
    PlanName,
    /// Plans carrying the same opaque identifier
    Identifier,
    /// Any other instance with the same plan name
    Atomic,
}

/// Immutable `(key, kind)` pair; equality and hashing are structural
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictDescriptor {
    key: String,
    kind: ConflictKind,
}

impl ConflictDescriptor {
    pub fn new(key: impl Into<String>, kind: ConflictKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }

    /// The wildcard descriptor produced by `atomic` and `_`
    pub fn atomic() -> Self {
        Self::new(ATOMIC_KEY, ConflictKind::Atomic)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ConflictKind {
        self.kind
    }

    /// Equal, independently owned copy
    pub fn duplicate(&self) -> Self {
        Self::new(self.key.clone(), self.kind)
    }

    /// Read one element of a `conflict(...)` annotation.
    ///
    /// Returns `None` for term shapes that do not name a conflict (numbers,
    /// named variables, predicates, nested lists). Variables starting with `_`
    /// are anonymous and read as `_`. The empty string maps to an identifier.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Atom(name) => Some(Self::new(name.clone(), ConflictKind::Identifier)),
            Term::Str(s) => Some(match s.chars().next() {
                Some('@') => Self::new(&s[1..], ConflictKind::PlanName),
                Some('+') | Some('-') => Self::new(s.clone(), ConflictKind::TriggerPattern),
                _ => Self::new(s.clone(), ConflictKind::Identifier),
            }),
            Term::Unnamed => Some(Self::atomic()),
            Term::Var(name) if name.starts_with('_') => Some(Self::atomic()),
            Term::Number(_) | Term::Var(_) | Term::Pred(_) | Term::List(_) => None,
        }
    }

    /// Parsed pattern of a [`ConflictKind::TriggerPattern`] descriptor
    pub fn trigger_pattern(&self) -> Option<Result<Trigger>> {
        match self.kind {
            ConflictKind::TriggerPattern => Some(Trigger::parse(&self.key).map_err(|e| {
                SyntaxError::TriggerPattern {
                    pattern: self.key.clone(),
                    message: e.to_string(),
                }
            })),
            _ => None,
        }
    }

    /// Check that a trigger pattern descriptor holds a parseable trigger
    pub fn validate(&self) -> Result<()> {
        match self.trigger_pattern() {
            Some(Err(e)) => Err(e),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TriggerPattern => write!(f, "trigger"),
            Self::PlanName => write!(f, "plan"),
            Self::Identifier => write!(f, "id"),
            Self::Atomic => write!(f, "atomic"),
        }
    }
}

impl fmt::Display for ConflictDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Pred;
    use std::collections::HashSet;

    #[test]
    fn test_extraction_grammar() {
        let cases = [
            (Term::atom("foo"), ConflictDescriptor::new("foo", ConflictKind::Identifier)),
            (Term::string("@myPlan"), ConflictDescriptor::new("myPlan", ConflictKind::PlanName)),
            (Term::string("+!goal"), ConflictDescriptor::new("+!goal", ConflictKind::TriggerPattern)),
            (Term::string("-b"), ConflictDescriptor::new("-b", ConflictKind::TriggerPattern)),
            (Term::string("bar"), ConflictDescriptor::new("bar", ConflictKind::Identifier)),
            (Term::Unnamed, ConflictDescriptor::new("_", ConflictKind::Atomic)),
            (Term::var("_Any"), ConflictDescriptor::new("_", ConflictKind::Atomic)),
        ];
        for (term, expected) in cases {
            assert_eq!(ConflictDescriptor::from_term(&term), Some(expected), "term {}", term);
        }
    }

    #[test]
    fn test_other_shapes_are_ignored() {
        assert_eq!(ConflictDescriptor::from_term(&Term::number(1.0)), None);
        assert_eq!(ConflictDescriptor::from_term(&Term::var("X")), None);
        assert_eq!(
            ConflictDescriptor::from_term(&Term::Pred(Pred::new("f").with_args(vec![Term::atom("a")]))),
            None
        );
    }

    #[test]
    fn test_empty_string_is_identifier() {
        assert_eq!(
            ConflictDescriptor::from_term(&Term::string("")),
            Some(ConflictDescriptor::new("", ConflictKind::Identifier))
        );
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = ConflictDescriptor::new("x", ConflictKind::Identifier);
        let mut set = HashSet::new();
        set.insert(a.duplicate());
        assert!(set.contains(&a));
        assert_ne!(a, ConflictDescriptor::new("x", ConflictKind::PlanName));
    }

    #[test]
    fn test_validate_trigger_pattern() {
        assert!(ConflictDescriptor::new("+!move(X)", ConflictKind::TriggerPattern).validate().is_ok());
        let bad = ConflictDescriptor::new("+!", ConflictKind::TriggerPattern).validate();
        assert!(matches!(bad, Err(SyntaxError::TriggerPattern { .. })));
        assert!(ConflictDescriptor::new("+!", ConflictKind::Identifier).validate().is_ok());
    }
}
