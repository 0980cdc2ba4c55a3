//! Context conditions: logical formulas over literals and relations.

use std::fmt;

use crate::term::{Pred, Term};
use crate::unifier::Unifier;

/// Relational operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Ne,
    Unify,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "\\==",
            Self::Unify => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A plan context condition
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalFormula {
    True,
    False,
    Literal(Pred),
    Not(Box<LogicalFormula>),
    And(Box<LogicalFormula>, Box<LogicalFormula>),
    Or(Box<LogicalFormula>, Box<LogicalFormula>),
    Rel { op: RelOp, left: Term, right: Term },
}

impl LogicalFormula {
    /// Literal condition; the bare atoms `true` and `false` become constants
    pub fn literal(pred: Pred) -> Self {
        if pred.is_atomic_form() {
            match pred.functor.as_str() {
                "true" => return Self::True,
                "false" => return Self::False,
                _ => {}
            }
        }
        Self::Literal(pred)
    }

    pub fn not(f: LogicalFormula) -> Self {
        Self::Not(Box::new(f))
    }

    pub fn and(left: LogicalFormula, right: LogicalFormula) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: LogicalFormula, right: LogicalFormula) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn rel(op: RelOp, left: Term, right: Term) -> Self {
        Self::Rel { op, left, right }
    }

    /// `true`, either as the constant or as a bare `true` literal
    pub fn is_true(&self) -> bool {
        match self {
            Self::True => true,
            Self::Literal(p) => p.is_atomic_form() && p.functor == "true",
            _ => false,
        }
    }

    pub fn capply(&self, u: &Unifier) -> Self {
        match self {
            Self::True => Self::True,
            Self::False => Self::False,
            Self::Literal(p) => Self::Literal(p.capply(u)),
            Self::Not(f) => Self::not(f.capply(u)),
            Self::And(l, r) => Self::and(l.capply(u), r.capply(u)),
            Self::Or(l, r) => Self::or(l.capply(u), r.capply(u)),
            Self::Rel { op, left, right } => Self::rel(*op, u.apply(left), u.apply(right)),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Or(_, _) => 1,
            Self::And(_, _) => 2,
            _ => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: u8, right: bool) -> fmt::Result {
        let prec = self.precedence();
        if prec < parent || (prec == parent && right && prec < 3) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for LogicalFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Literal(p) => write!(f, "{}", p),
            Self::Not(inner) => {
                write!(f, "not ")?;
                inner.fmt_operand(f, 3, false)
            }
            Self::And(l, r) => {
                l.fmt_operand(f, 2, false)?;
                write!(f, " & ")?;
                r.fmt_operand(f, 2, true)
            }
            Self::Or(l, r) => {
                l.fmt_operand(f, 1, false)?;
                write!(f, " | ")?;
                r.fmt_operand(f, 1, true)
            }
            Self::Rel { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str) -> LogicalFormula {
        LogicalFormula::literal(Pred::new(name))
    }

    #[test]
    fn test_rendering_parenthesizes_by_precedence() {
        let f = LogicalFormula::and(LogicalFormula::or(lit("a"), lit("b")), lit("c"));
        assert_eq!(f.to_string(), "(a | b) & c");

        let g = LogicalFormula::and(lit("a"), LogicalFormula::and(lit("b"), lit("c")));
        assert_eq!(g.to_string(), "a & (b & c)");

        let h = LogicalFormula::not(LogicalFormula::and(lit("a"), lit("b")));
        assert_eq!(h.to_string(), "not (a & b)");
    }

    #[test]
    fn test_true_literal_is_the_constant() {
        assert_eq!(LogicalFormula::literal(Pred::new("true")), LogicalFormula::True);
        assert_eq!(LogicalFormula::literal(Pred::new("false")), LogicalFormula::False);
        assert!(LogicalFormula::Literal(Pred::new("true")).is_true());
        assert!(!LogicalFormula::literal(Pred::new("true").negated()).is_true());
        assert!(!lit("ready").is_true());
    }

    #[test]
    fn test_relational_rendering() {
        let f = LogicalFormula::rel(RelOp::Ne, Term::var("X"), Term::number(3.0));
        assert_eq!(f.to_string(), "X \\== 3");
    }

    #[test]
    fn test_capply_substitutes_literals() {
        let mut u = Unifier::new();
        assert!(u.bind("X", Term::atom("home")));
        let f = LogicalFormula::literal(Pred::new("at").with_args(vec![Term::var("X")]));
        assert_eq!(f.capply(&u).to_string(), "at(home)");
    }
}
