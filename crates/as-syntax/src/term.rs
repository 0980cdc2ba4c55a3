//! Term types for AgentSpeak sources
//!
//! Terms are the shared vocabulary of triggers, context formulas, plan bodies
//! and annotations: atoms, quoted strings, numbers, variables, predicates with
//! arguments and annotations, and lists.

use std::fmt;

use crate::unifier::Unifier;

/// A first-order term
#[derive(Debug, Clone)]
pub enum Term {
    /// Constant symbol (`foo`)
    Atom(String),

    /// Quoted string (`"foo"`)
    Str(String),

    /// Numeric constant
    Number(f64),

    /// Named variable (`X`, `_Tmp`)
    Var(String),

    /// Anonymous variable (`_`)
    Unnamed,

    /// Predicate with arguments and/or annotations (`p(a)[source(self)]`)
    Pred(Pred),

    /// List (`[a, b | T]`)
    List(ListTerm),
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn list(items: Vec<Term>) -> Self {
        Self::List(ListTerm::new(items))
    }

    /// Name of the constant this term denotes, if it is one.
    ///
    /// A predicate without arguments, annotations or negation counts as an
    /// atom, so `Pred::new("atomic")` and `Term::atom("atomic")` agree.
    pub fn atom_name(&self) -> Option<&str> {
        match self {
            Self::Atom(name) => Some(name),
            Self::Pred(p) if p.is_atomic_form() => Some(&p.functor),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var(_) | Self::Unnamed)
    }

    pub fn is_ground(&self) -> bool {
        match self {
            Self::Var(_) | Self::Unnamed => false,
            Self::Pred(p) => p.is_ground(),
            Self::List(l) => {
                l.items.iter().all(Term::is_ground) && l.tail.as_deref().map_or(true, Term::is_ground)
            }
            _ => true,
        }
    }

    /// Apply a substitution, producing a new term
    pub fn capply(&self, u: &Unifier) -> Term {
        u.apply(self)
    }
}

impl From<Pred> for Term {
    /// Predicates in atomic form collapse to [`Term::Atom`].
    fn from(pred: Pred) -> Self {
        if pred.is_atomic_form() {
            Self::Atom(pred.functor)
        } else {
            Self::Pred(pred)
        }
    }
}

/// An atom and a predicate in atomic form are the same term
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Atom(a), Self::Atom(b)) => a == b,
            (Self::Atom(a), Self::Pred(p)) | (Self::Pred(p), Self::Atom(a)) => {
                p.is_atomic_form() && &p.functor == a
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Var(a), Self::Var(b)) => a == b,
            (Self::Unnamed, Self::Unnamed) => true,
            (Self::Pred(a), Self::Pred(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Predicate: functor, arguments, annotations and strong negation
#[derive(Debug, Clone)]
pub struct Pred {
    pub functor: String,
    pub args: Vec<Term>,
    pub negated: bool,
    annots: Vec<Term>,
}

impl Pred {
    pub fn new(functor: impl Into<String>) -> Self {
        Self {
            functor: functor.into(),
            args: Vec::new(),
            negated: false,
            annots: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Term>) -> Self {
        self.args = args;
        self
    }

    pub fn with_annots(mut self, annots: impl IntoIterator<Item = Term>) -> Self {
        for annot in annots {
            self.add_annot(annot);
        }
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    /// View a term as a predicate; atoms become argument-less predicates
    pub fn from_term(term: Term) -> Option<Self> {
        match term {
            Term::Atom(name) => Some(Self::new(name)),
            Term::Pred(p) => Some(p),
            _ => None,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn annots(&self) -> &[Term] {
        &self.annots
    }

    pub fn has_annots(&self) -> bool {
        !self.annots.is_empty()
    }

    /// Add an annotation; duplicates are dropped
    pub fn add_annot(&mut self, annot: Term) {
        if !self.annots.contains(&annot) {
            self.annots.push(annot);
        }
    }

    pub fn has_annot(&self, annot: &Term) -> bool {
        self.annots.contains(annot)
    }

    pub fn is_internal_action(&self) -> bool {
        self.functor.starts_with('.')
    }

    pub(crate) fn is_atomic_form(&self) -> bool {
        self.args.is_empty() && self.annots.is_empty() && !self.negated
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground) && self.annots.iter().all(Term::is_ground)
    }

    pub fn capply(&self, u: &Unifier) -> Pred {
        Pred {
            functor: self.functor.clone(),
            args: self.args.iter().map(|t| u.apply(t)).collect(),
            negated: self.negated,
            annots: Vec::new(),
        }
        .with_annots(self.annots.iter().map(|t| u.apply(t)))
    }
}

/// Annotations compare as sets
impl PartialEq for Pred {
    fn eq(&self, other: &Self) -> bool {
        self.functor == other.functor
            && self.negated == other.negated
            && self.args == other.args
            && self.annots.len() == other.annots.len()
            && self.annots.iter().all(|a| other.annots.contains(a))
    }
}

/// List term with an optional tail (`[H|T]`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListTerm {
    pub items: Vec<Term>,
    pub tail: Option<Box<Term>>,
}

impl ListTerm {
    pub fn new(items: Vec<Term>) -> Self {
        Self { items, tail: None }
    }

    pub fn with_tail(mut self, tail: Term) -> Self {
        self.tail = Some(Box::new(tail));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.tail.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ListTerm {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// === Rendering ===

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => write!(f, "{}", name),
            Self::Str(s) => write_quoted(f, s),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Var(name) => write!(f, "{}", name),
            Self::Unnamed => write!(f, "_"),
            Self::Pred(p) => write!(f, "{}", p),
            Self::List(l) => write!(f, "{}", l),
        }
    }
}

impl fmt::Display for Pred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}", self.functor)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            write_joined(f, &self.args)?;
            write!(f, ")")?;
        }
        if !self.annots.is_empty() {
            write!(f, "[")?;
            write_joined(f, &self.annots)?;
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Display for ListTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        write_joined(f, &self.items)?;
        if let Some(tail) = &self.tail {
            write!(f, "|{}", tail)?;
        }
        write!(f, "]")
    }
}
