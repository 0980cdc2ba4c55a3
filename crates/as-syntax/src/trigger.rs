//! Trigger events: additions and deletions of beliefs and goals.

use std::fmt;

use crate::term::Pred;
use crate::unifier::Unifier;
use crate::Result;

/// Trigger operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerOp {
    /// `+`
    Add,
    /// `-`
    Del,
}

/// What kind of mental attitude the event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    /// Belief change (`+b`)
    Belief,
    /// Achievement goal (`+!g`)
    Achieve,
    /// Test goal (`+?g`)
    Test,
}

/// A trigger event such as `+!g(X)` or `-b[source(A)]`
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub operator: TriggerOp,
    pub kind: TriggerType,
    pub literal: Pred,
}

impl Trigger {
    pub fn new(operator: TriggerOp, kind: TriggerType, literal: Pred) -> Self {
        Self {
            operator,
            kind,
            literal,
        }
    }

    /// Parse a trigger from text, e.g. `"+!goal(X)"`
    pub fn parse(s: &str) -> Result<Self> {
        crate::parser::parse_trigger(s)
    }

    pub fn is_goal(&self) -> bool {
        self.kind != TriggerType::Belief
    }

    pub fn is_addition(&self) -> bool {
        self.operator == TriggerOp::Add
    }

    /// Predicate indicator, e.g. `+!g/2`
    pub fn predicate_indicator(&self) -> String {
        format!("{}{}{}/{}", self.operator, self.kind, self.literal.functor, self.literal.arity())
    }

    pub fn capply(&self, u: &Unifier) -> Self {
        Self {
            operator: self.operator,
            kind: self.kind,
            literal: self.literal.capply(u),
        }
    }
}

impl fmt::Display for TriggerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Del => write!(f, "-"),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Belief => Ok(()),
            Self::Achieve => write!(f, "!"),
            Self::Test => write!(f, "?"),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.operator, self.kind, self.literal)
    }
}
