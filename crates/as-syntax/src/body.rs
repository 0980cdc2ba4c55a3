//! Plan bodies: sequences of actions, goals and belief updates.

use std::fmt;

use crate::term::Term;
use crate::unifier::Unifier;

/// Kind of a body step, given by its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    Action,
    InternalAction,
    Achieve,
    AchieveNewFocus,
    Test,
    AddBel,
    DelBel,
    DelAddBel,
}

impl BodyType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Action | Self::InternalAction => "",
            Self::Achieve => "!",
            Self::AchieveNewFocus => "!!",
            Self::Test => "?",
            Self::AddBel => "+",
            Self::DelBel => "-",
            Self::DelAddBel => "-+",
        }
    }
}

/// One step of a plan body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyLiteral {
    pub kind: BodyType,
    pub term: Term,
}

impl BodyLiteral {
    pub fn new(kind: BodyType, term: Term) -> Self {
        Self { kind, term }
    }

    /// Plain or internal action, depending on the functor (`.print` is internal)
    pub fn action(term: Term) -> Self {
        let internal = match &term {
            Term::Atom(name) => name.starts_with('.'),
            Term::Pred(p) => p.is_internal_action(),
            _ => false,
        };
        let kind = if internal {
            BodyType::InternalAction
        } else {
            BodyType::Action
        };
        Self { kind, term }
    }

    pub fn capply(&self, u: &Unifier) -> Self {
        Self {
            kind: self.kind,
            term: u.apply(&self.term),
        }
    }
}

/// Ordered plan body; empty for plans with no `<-` part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanBody {
    steps: Vec<BodyLiteral>,
}

impl PlanBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<BodyLiteral>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: BodyLiteral) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[BodyLiteral] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty_body(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn capply(&self, u: &Unifier) -> Self {
        Self {
            steps: self.steps.iter().map(|s| s.capply(u)).collect(),
        }
    }
}

impl fmt::Display for BodyLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.term)
    }
}

impl fmt::Display for PlanBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
