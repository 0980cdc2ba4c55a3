//! Variable bindings and unification.

use std::collections::HashMap;

use crate::term::{ListTerm, Pred, Term};
use crate::trigger::Trigger;

/// A substitution from variable names to terms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unifier {
    bindings: HashMap<String, Term>,
}

impl Unifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind `var` to `value`; refused if `var` occurs in `value`
    pub fn bind(&mut self, var: impl Into<String>, value: Term) -> bool {
        let var = var.into();
        let value = self.apply(&value);
        if occurs(&var, &value) {
            return false;
        }
        self.bindings.insert(var, value);
        true
    }

    /// Follow variable bindings until reaching an unbound variable or a non-variable
    fn deref(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Var(name) = current {
            match self.bindings.get(name) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Replace every bound variable in `term` by its value
    pub fn apply(&self, term: &Term) -> Term {
        match self.deref(term) {
            Term::Pred(p) => Term::Pred(p.capply(self)),
            Term::List(l) => Term::List(ListTerm {
                items: l.items.iter().map(|t| self.apply(t)).collect(),
                tail: l.tail.as_deref().map(|t| Box::new(self.apply(t))),
            }),
            other => other,
        }
    }

    /// Unify two terms; bindings are left untouched when unification fails
    pub fn unifies(&mut self, a: &Term, b: &Term) -> bool {
        let snapshot = self.bindings.clone();
        if self.unifies_no_undo(a, b) {
            true
        } else {
            self.bindings = snapshot;
            false
        }
    }

    /// Unify two terms, keeping partial bindings on failure
    pub fn unifies_no_undo(&mut self, a: &Term, b: &Term) -> bool {
        let a = self.deref(a);
        let b = self.deref(b);
        match (&a, &b) {
            (Term::Unnamed, _) | (_, Term::Unnamed) => true,
            (Term::Var(x), Term::Var(y)) if x == y => true,
            (Term::Var(x), other) | (other, Term::Var(x)) => self.bind(x.clone(), other.clone()),
            (Term::Pred(p), Term::Pred(q)) => self.unifies_preds(p, q),
            (Term::Atom(name), Term::Pred(q)) => q.args.is_empty() && !q.negated && &q.functor == name,
            (Term::Pred(p), Term::Atom(name)) => {
                p.args.is_empty() && !p.negated && !p.has_annots() && &p.functor == name
            }
            (Term::List(l), Term::List(r)) => self.unifies_lists(l, r),
            _ => a == b,
        }
    }

    /// Unify two predicates.
    ///
    /// Every annotation of `p` must unify with some annotation of `q`, so the
    /// relation is asymmetric: `p[a]` unifies with `p[a,b]` but not the reverse.
    pub fn unifies_preds(&mut self, p: &Pred, q: &Pred) -> bool {
        if p.functor != q.functor || p.negated != q.negated || p.arity() != q.arity() {
            return false;
        }
        for (x, y) in p.args.iter().zip(&q.args) {
            if !self.unifies_no_undo(x, y) {
                return false;
            }
        }
        p.annots()
            .iter()
            .all(|a| q.annots().iter().any(|b| self.unifies(a, b)))
    }

    fn unifies_lists(&mut self, l: &ListTerm, r: &ListTerm) -> bool {
        let shared = l.items.len().min(r.items.len());
        for (x, y) in l.items[..shared].iter().zip(&r.items[..shared]) {
            if !self.unifies_no_undo(x, y) {
                return false;
            }
        }
        let rest = |list: &ListTerm| {
            Term::List(ListTerm {
                items: list.items[shared..].to_vec(),
                tail: list.tail.clone(),
            })
        };
        match (&l.tail, &r.tail) {
            _ if l.items.len() == r.items.len() => match (&l.tail, &r.tail) {
                (None, None) => true,
                (Some(t), None) | (None, Some(t)) => {
                    self.unifies_no_undo(t, &Term::List(ListTerm::default()))
                }
                (Some(x), Some(y)) => self.unifies_no_undo(x, y),
            },
            (Some(t), _) if l.items.len() < r.items.len() => self.unifies_no_undo(t, &rest(r)),
            (_, Some(t)) if r.items.len() < l.items.len() => self.unifies_no_undo(t, &rest(l)),
            _ => false,
        }
    }

    /// Unify two trigger events: same operator and type, literals unified
    pub fn unifies_triggers(&mut self, a: &Trigger, b: &Trigger) -> bool {
        a.operator == b.operator && a.kind == b.kind && self.unifies_preds(&a.literal, &b.literal)
    }
}

fn occurs(var: &str, term: &Term) -> bool {
    match term {
        Term::Var(name) => name == var,
        Term::Pred(p) => p.args.iter().chain(p.annots()).any(|t| occurs(var, t)),
        Term::List(l) => {
            l.items.iter().any(|t| occurs(var, t)) || l.tail.as_deref().map_or(false, |t| occurs(var, t))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pred(functor: &str, args: Vec<Term>) -> Term {
        Term::Pred(Pred::new(functor).with_args(args))
    }

    #[test]
    fn test_binds_variables() {
        let mut u = Unifier::new();
        assert!(u.unifies(&pred("p", vec![Term::var("X"), Term::atom("b")]), &pred("p", vec![Term::atom("a"), Term::var("Y")])));
        assert_eq!(u.get("X"), Some(&Term::atom("a")));
        assert_eq!(u.apply(&Term::var("Y")), Term::atom("b"));
    }

    #[test]
    fn test_failed_unification_restores_bindings() {
        let mut u = Unifier::new();
        let ok = u.unifies(&pred("p", vec![Term::var("X"), Term::atom("b")]), &pred("p", vec![Term::atom("a"), Term::atom("c")]));
        assert!(!ok);
        assert!(u.is_empty());
    }

    #[test]
    fn test_annotations_must_be_subset() {
        let general = Pred::new("p").with_annots([Term::atom("a")]);
        let specific = Pred::new("p").with_annots([Term::atom("a"), Term::atom("b")]);
        assert!(Unifier::new().unifies_preds(&general, &specific));
        assert!(!Unifier::new().unifies_preds(&specific, &general));
    }

    #[test]
    fn test_list_tail_unification() {
        let pattern = Term::List(ListTerm::new(vec![Term::var("H")]).with_tail(Term::var("T")));
        let value = Term::list(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]);
        let mut u = Unifier::new();
        assert!(u.unifies(&pattern, &value));
        assert_eq!(u.apply(&Term::var("T")), Term::list(vec![Term::atom("b"), Term::atom("c")]));
    }

    #[test]
    fn test_occurs_check() {
        let mut u = Unifier::new();
        assert!(!u.unifies(&Term::var("X"), &pred("f", vec![Term::var("X")])));
    }

    #[test]
    fn test_anonymous_variable_matches_anything() {
        let mut u = Unifier::new();
        assert!(u.unifies(&Term::Unnamed, &pred("f", vec![Term::atom("a")])));
        assert!(u.is_empty());
    }
}
