//! # as-syntax
//!
//! AgentSpeak plans and their declarative conflict sets.
//!
//! A [`Plan`] couples a trigger event with an optional context condition and a
//! body. Annotations on the plan label (`@name[atomic, conflict([...])]`) are
//! scanned once, when the label is assigned, into a set of
//! [`ConflictDescriptor`]s. A resolver pass later turns those descriptors into
//! concrete conflicting plan ids stored on each plan, which a scheduler
//! queries before running two plans at the same time.
//!
//! ## Example
//!
//! ```rust
//! use as_syntax::*;
//!
//! let plan = Plan::parse(r#"@p1[conflict(["@p2", "+!move"])] +!go : ready <- move."#).unwrap();
//! assert!(plan.contains_conflict(&ConflictDescriptor::new("p2", ConflictKind::PlanName)));
//! assert!(plan.contains_conflict(&ConflictDescriptor::new("+!move", ConflictKind::TriggerPattern)));
//! assert_eq!(plan.to_string(), r#"@p1[conflict(["@p2","+!move"])] +!go : ready <- move."#);
//! ```

pub mod body;
pub mod conflict;
pub mod dom;
pub mod formula;
pub mod parser;
pub mod plan;
pub mod resolver;
pub mod source;
pub mod term;
pub mod trigger;
pub mod unifier;

pub use body::{BodyLiteral, BodyType, PlanBody};
pub use conflict::{ConflictDescriptor, ConflictKind};
pub use dom::{Element, Node, ToDom};
pub use formula::{LogicalFormula, RelOp};
pub use parser::ParseOptions;
pub use plan::{Plan, PlanSlot, PLAN_ARITY};
pub use resolver::{ConflictResolver, ResolutionReport};
pub use source::SourceInfo;
pub use term::{ListTerm, Pred, Term};
pub use trigger::{Trigger, TriggerOp, TriggerType};
pub use unifier::Unifier;

use thiserror::Error;

/// Errors produced while parsing or assembling plans
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("Invalid trigger pattern {pattern:?} in conflict annotation: {message}")]
    TriggerPattern { pattern: String, message: String },

    #[error("Plan slot {index} expects a {expected}")]
    SlotType { index: usize, expected: &'static str },

    #[error("Plan slot {0} is out of range (plans have {PLAN_ARITY} slots)")]
    SlotOutOfRange(usize),

    #[error("Structured document error: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, SyntaxError>;
