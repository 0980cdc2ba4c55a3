//! AgentSpeak plans.
//!
//! A plan is `[@label] trigger [: context] [<- body]`. The label annotations
//! drive three flags (`atomic`, `breakpoint`, `all_unifs`) and the plan's
//! static conflict set; see [`Plan::set_label`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::body::PlanBody;
use crate::conflict::ConflictDescriptor;
use crate::formula::LogicalFormula;
use crate::source::SourceInfo;
use crate::term::{Pred, Term};
use crate::trigger::Trigger;
use crate::unifier::Unifier;
use crate::{Result, SyntaxError};

const ATOMIC: &str = "atomic";
const BREAKPOINT: &str = "breakpoint";
const ALL_UNIFS: &str = "all_unifs";
const CONFLICT: &str = "conflict";
const NO_LABEL: &str = "nolabel";

/// Number of positional slots of a plan viewed as a term
pub const PLAN_ARITY: usize = 4;

/// One positional slot of a plan: label, trigger, context, body
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSlot {
    Label(Pred),
    Trigger(Trigger),
    Context(LogicalFormula),
    Body(PlanBody),
}

/// An executable plan with its conflict bookkeeping.
///
/// Label and context sit behind `Arc` so [`Plan::clone_only_body`] can share
/// them with the source plan; every other copy owns fresh values.
#[derive(Debug)]
pub struct Plan {
    label: Option<Arc<Pred>>,
    trigger: Trigger,
    context: Option<Arc<LogicalFormula>>,
    body: PlanBody,

    is_atomic: bool,
    has_breakpoint: bool,
    is_all_unifs: bool,

    /// Rendered as `{ ... }` instead of `... .`
    is_term: bool,

    conflicts: HashSet<ConflictDescriptor>,
    /// `None` until a resolver has looked at this plan
    conflicting_plans: Option<HashSet<String>>,

    src_info: Option<SourceInfo>,
}

impl Plan {
    /// Build a plan; bad trigger patterns in `conflict` annotations are
    /// logged and the plan is still built.
    pub fn new(
        label: Option<Pred>,
        trigger: Trigger,
        context: Option<LogicalFormula>,
        body: Option<PlanBody>,
    ) -> Self {
        let mut plan = Self::bare(trigger, body.unwrap_or_default());
        plan.set_label(label);
        plan.set_context(context);
        plan
    }

    /// Like [`Plan::new`] but fails on the first bad trigger pattern
    pub fn try_new(
        label: Option<Pred>,
        trigger: Trigger,
        context: Option<LogicalFormula>,
        body: Option<PlanBody>,
    ) -> Result<Self> {
        let mut plan = Self::bare(trigger, body.unwrap_or_default());
        if let Some(issue) = plan.set_label(label).into_iter().next() {
            return Err(issue);
        }
        plan.set_context(context);
        Ok(plan)
    }

    fn bare(trigger: Trigger, body: PlanBody) -> Self {
        Self {
            label: None,
            trigger,
            context: None,
            body,
            is_atomic: false,
            has_breakpoint: false,
            is_all_unifs: false,
            is_term: false,
            conflicts: HashSet::new(),
            conflicting_plans: None,
            src_info: None,
        }
    }

    /// Parse a single plan; failures are logged and yield `None`
    pub fn parse(source: &str) -> Option<Self> {
        match crate::parser::parse_plan(source) {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::error!(plan = source, error = %e, "Error parsing plan");
                None
            }
        }
    }

    // === Label and annotations ===

    /// Assign the label and scan its annotations.
    ///
    /// Accumulates: flags already set stay set and descriptors from earlier
    /// labels stay in the conflict set. Build a fresh plan to start over.
    ///
    /// Returns the trigger patterns that failed to parse. Those descriptors
    /// are still recorded.
    pub fn set_label(&mut self, label: Option<Pred>) -> Vec<SyntaxError> {
        let mut issues = Vec::new();
        if let Some(pred) = &label {
            for annot in pred.annots() {
                if let Some(name) = annot.atom_name() {
                    match name {
                        ATOMIC => {
                            self.is_atomic = true;
                            self.conflicts.insert(ConflictDescriptor::atomic());
                        }
                        BREAKPOINT => self.has_breakpoint = true,
                        ALL_UNIFS => self.is_all_unifs = true,
                        _ => {}
                    }
                } else if let Term::Pred(p) = annot {
                    if p.functor == CONFLICT {
                        self.process_conflict_set(p, &mut issues);
                    }
                }
            }
        }
        for issue in &issues {
            tracing::warn!(plan = %label_name(label.as_ref()), error = %issue, "Bad conflict annotation");
        }
        self.label = label.map(Arc::new);
        issues
    }

    fn process_conflict_set(&mut self, annot: &Pred, issues: &mut Vec<SyntaxError>) {
        match annot.args.first() {
            Some(Term::List(list)) => {
                for term in list {
                    self.add_conflict_from(term, issues);
                }
            }
            Some(term) => self.add_conflict_from(term, issues),
            None => {}
        }
    }

    fn add_conflict_from(&mut self, term: &Term, issues: &mut Vec<SyntaxError>) {
        if let Some(descriptor) = ConflictDescriptor::from_term(term) {
            if let Err(e) = descriptor.validate() {
                issues.push(e);
            }
            self.conflicts.insert(descriptor);
        }
    }

    pub fn label(&self) -> Option<&Pred> {
        self.label.as_deref()
    }

    /// Identifier used by conflict registries: the label functor, or a
    /// content fingerprint for anonymous plans
    pub fn id(&self) -> String {
        match &self.label {
            Some(label) => label.functor.clone(),
            None => {
                let digest = Sha256::digest(self.to_string().as_bytes());
                format!("anon_{}", &hex::encode(digest)[..12])
            }
        }
    }

    pub fn is_atomic(&self) -> bool {
        self.is_atomic
    }

    pub fn has_breakpoint(&self) -> bool {
        self.has_breakpoint
    }

    pub fn is_all_unifs(&self) -> bool {
        self.is_all_unifs
    }

    // === Static conflict set ===

    pub fn conflicts(&self) -> &HashSet<ConflictDescriptor> {
        &self.conflicts
    }

    pub fn contains_conflict(&self, descriptor: &ConflictDescriptor) -> bool {
        self.conflicts.contains(descriptor)
    }

    // === Runtime conflict registry ===

    pub fn register_conflicting_plan(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::trace!(plan = %self.id(), conflicting = %id, "Registering conflicting plan");
        self.conflicting_plans.get_or_insert_with(HashSet::new).insert(id);
    }

    pub fn unregister_conflicting_plan(&mut self, id: &str) {
        if let Some(plans) = self.conflicting_plans.as_mut() {
            plans.remove(id);
        }
    }

    /// Allocate an empty registry, marking the plan as checked
    pub fn init_conflicting_plans(&mut self) {
        self.conflicting_plans.get_or_insert_with(HashSet::new);
    }

    pub fn has_conflicting_plans(&self) -> bool {
        self.conflicting_plans.as_ref().map_or(false, |p| !p.is_empty())
    }

    /// `false` when nothing was ever registered
    pub fn conflicts_with(&self, id: &str) -> bool {
        self.conflicting_plans.as_ref().map_or(false, |p| p.contains(id))
    }

    /// `None` if never checked, `Some(empty)` if checked with no conflicts
    pub fn conflicting_plans(&self) -> Option<&HashSet<String>> {
        self.conflicting_plans.as_ref()
    }

    // === Trigger, context, body ===

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn context(&self) -> Option<&LogicalFormula> {
        self.context.as_deref()
    }

    /// Set the context; `true` is stored as no context
    pub fn set_context(&mut self, context: Option<LogicalFormula>) {
        self.context = context.filter(|c| !c.is_true()).map(Arc::new);
    }

    pub fn body(&self) -> &PlanBody {
        &self.body
    }

    pub fn set_as_term(&mut self, is_term: bool) {
        self.is_term = is_term;
    }

    pub fn is_term(&self) -> bool {
        self.is_term
    }

    pub fn src_info(&self) -> Option<&SourceInfo> {
        self.src_info.as_ref()
    }

    pub fn set_src_info(&mut self, src_info: Option<SourceInfo>) {
        self.src_info = src_info;
    }

    /// Unify this plan's trigger with an event.
    ///
    /// Annotations of the plan trigger must be a subset of the event's, so a
    /// plan for `+!g` is relevant for `+!g[source(bob)]` but not the reverse.
    pub fn is_relevant(&self, event: &Trigger) -> Option<Unifier> {
        let mut u = Unifier::new();
        if u.unifies_triggers(&self.trigger, event) {
            Some(u)
        } else {
            None
        }
    }

    // === Positional view ===

    pub fn arity(&self) -> usize {
        PLAN_ARITY
    }

    /// Slot `i`: `nolabel` stands for a missing label, `true` for a missing context
    pub fn slot(&self, index: usize) -> Option<PlanSlot> {
        match index {
            0 => Some(PlanSlot::Label(
                self.label().cloned().unwrap_or_else(|| Pred::new(NO_LABEL)),
            )),
            1 => Some(PlanSlot::Trigger(self.trigger.clone())),
            2 => Some(PlanSlot::Context(
                self.context().cloned().unwrap_or(LogicalFormula::True),
            )),
            3 => Some(PlanSlot::Body(self.body.clone())),
            _ => None,
        }
    }

    /// Replace slot `i`. A new label goes through [`Plan::set_label`].
    pub fn set_slot(&mut self, index: usize, slot: PlanSlot) -> Result<()> {
        match (index, slot) {
            (0, PlanSlot::Label(label)) => {
                self.set_label(Some(label));
            }
            (1, PlanSlot::Trigger(trigger)) => self.trigger = trigger,
            (2, PlanSlot::Context(context)) => self.set_context(Some(context)),
            (3, PlanSlot::Body(body)) => self.body = body,
            (0, _) => return Err(SyntaxError::SlotType { index, expected: "label" }),
            (1, _) => return Err(SyntaxError::SlotType { index, expected: "trigger" }),
            (2, _) => return Err(SyntaxError::SlotType { index, expected: "context" }),
            (3, _) => return Err(SyntaxError::SlotType { index, expected: "body" }),
            _ => return Err(SyntaxError::SlotOutOfRange(index)),
        }
        Ok(())
    }

    // === Copies ===

    fn derived(
        &self,
        label: Option<Arc<Pred>>,
        trigger: Trigger,
        context: Option<Arc<LogicalFormula>>,
        body: PlanBody,
    ) -> Self {
        Self {
            label,
            trigger,
            context,
            body,
            is_atomic: self.is_atomic,
            has_breakpoint: self.has_breakpoint,
            is_all_unifs: self.is_all_unifs,
            is_term: self.is_term,
            conflicts: self.conflicts.iter().map(ConflictDescriptor::duplicate).collect(),
            conflicting_plans: None,
            src_info: self.src_info.clone(),
        }
    }

    /// Apply a substitution to every part of the plan
    pub fn capply(&self, u: &Unifier) -> Self {
        self.derived(
            self.label.as_ref().map(|l| Arc::new(l.capply(u))),
            self.trigger.capply(u),
            self.context.as_ref().map(|c| Arc::new(c.capply(u))),
            self.body.capply(u),
        )
    }

    /// Structural copy owning all of its parts
    pub fn deep_copy(&self) -> Self {
        self.derived(
            self.label.as_ref().map(|l| Arc::new(Pred::clone(l))),
            self.trigger.clone(),
            self.context.as_ref().map(|c| Arc::new(LogicalFormula::clone(c))),
            self.body.clone(),
        )
    }

    /// Copy for a new intention: trigger and body are copied, label and
    /// context are shared with `self`
    pub fn clone_only_body(&self) -> Self {
        self.derived(
            self.label.clone(),
            self.trigger.clone(),
            self.context.clone(),
            self.body.clone(),
        )
    }

    pub fn shares_label_with(&self, other: &Plan) -> bool {
        matches!((&self.label, &other.label), (Some(a), Some(b)) if Arc::ptr_eq(a, b))
    }

    pub fn shares_context_with(&self, other: &Plan) -> bool {
        matches!((&self.context, &other.context), (Some(a), Some(b)) if Arc::ptr_eq(a, b))
    }
}

fn label_name(label: Option<&Pred>) -> &str {
    label.map_or(NO_LABEL, |l| l.functor.as_str())
}

/// Same as [`Plan::deep_copy`]; the runtime registry is not copied
impl Clone for Plan {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

/// Plans are equal when trigger, context and body are; label, flags and
/// conflict sets do not take part
impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let same_context = match (&self.context, &other.context) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        same_context && self.trigger == other.trigger && self.body == other.body
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.is_term { ("{ ", " }") } else { ("", ".") };
        write!(f, "{}", open)?;
        if let Some(label) = &self.label {
            write!(f, "@{} ", label)?;
        }
        write!(f, "{}", self.trigger)?;
        if let Some(context) = &self.context {
            write!(f, " : {}", context)?;
        }
        if !self.body.is_empty_body() {
            write!(f, " <- {}", self.body)?;
        }
        write!(f, "{}", close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictKind;
    use crate::trigger::{TriggerOp, TriggerType};

    fn achieve(name: &str) -> Trigger {
        Trigger::new(TriggerOp::Add, TriggerType::Achieve, Pred::new(name))
    }

    fn labelled(annots: Vec<Term>) -> Plan {
        Plan::new(Some(Pred::new("p1").with_annots(annots)), achieve("g"), None, None)
    }

    #[test]
    fn test_flags_from_annotations() {
        let plan = labelled(vec![Term::atom("atomic"), Term::atom("breakpoint"), Term::atom("all_unifs")]);
        assert!(plan.is_atomic());
        assert!(plan.has_breakpoint());
        assert!(plan.is_all_unifs());
        assert!(plan.contains_conflict(&ConflictDescriptor::atomic()));
        assert_eq!(plan.conflicts().len(), 1);
    }

    #[test]
    fn test_unlabelled_plan_has_empty_conflict_set() {
        let plan = Plan::new(None, achieve("g"), None, None);
        assert!(plan.conflicts().is_empty());
        assert!(!plan.is_atomic());
        assert!(plan.conflicting_plans().is_none());
    }

    #[test]
    fn test_conflict_list_and_scalar_agree() {
        let x = Term::string("@p2");
        let scalar = labelled(vec![Term::Pred(Pred::new("conflict").with_args(vec![x.clone()]))]);
        let list = labelled(vec![Term::Pred(Pred::new("conflict").with_args(vec![Term::list(vec![x])]))]);
        assert_eq!(scalar.conflicts(), list.conflicts());
        assert!(scalar.contains_conflict(&ConflictDescriptor::new("p2", ConflictKind::PlanName)));
    }

    #[test]
    fn test_conflict_without_argument_is_ignored() {
        let plan = labelled(vec![Term::atom("conflict")]);
        assert!(plan.conflicts().is_empty());
    }

    #[test]
    fn test_bad_trigger_pattern_is_reported_not_fatal() {
        let mut plan = Plan::new(None, achieve("g"), None, None);
        let label = Pred::new("p").with_annots([Term::Pred(
            Pred::new("conflict").with_args(vec![Term::string("+!")]),
        )]);
        let issues = plan.set_label(Some(label.clone()));
        assert_eq!(issues.len(), 1);
        assert!(plan.contains_conflict(&ConflictDescriptor::new("+!", ConflictKind::TriggerPattern)));

        let strict = Plan::try_new(Some(label), achieve("g"), None, None);
        assert!(matches!(strict, Err(SyntaxError::TriggerPattern { .. })));
    }

    #[test]
    fn test_set_label_accumulates() {
        let mut plan = labelled(vec![
            Term::atom("breakpoint"),
            Term::Pred(Pred::new("conflict").with_args(vec![Term::atom("a")])),
        ]);
        plan.set_label(Some(Pred::new("p2").with_annots([Term::Pred(
            Pred::new("conflict").with_args(vec![Term::atom("b")]),
        )])));
        assert_eq!(plan.label().map(|l| l.functor.as_str()), Some("p2"));
        assert!(plan.has_breakpoint());
        assert!(plan.contains_conflict(&ConflictDescriptor::new("a", ConflictKind::Identifier)));
        assert!(plan.contains_conflict(&ConflictDescriptor::new("b", ConflictKind::Identifier)));
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut plan = labelled(vec![]);
        assert!(!plan.conflicts_with("anything"));
        assert!(!plan.has_conflicting_plans());
        plan.unregister_conflicting_plan("p2");
        assert!(plan.conflicting_plans().is_none());

        plan.register_conflicting_plan("p2");
        plan.register_conflicting_plan("p2");
        assert!(plan.conflicts_with("p2"));
        assert_eq!(plan.conflicting_plans().map(HashSet::len), Some(1));

        plan.unregister_conflicting_plan("p2");
        assert!(!plan.conflicts_with("p2"));
        assert!(!plan.has_conflicting_plans());
        assert_eq!(plan.conflicting_plans().map(HashSet::len), Some(0));
    }

    #[test]
    fn test_equality_ignores_label_and_conflicts() {
        let a = labelled(vec![Term::atom("atomic")]);
        let b = Plan::new(Some(Pred::new("other")), achieve("g"), None, None);
        assert_eq!(a, b);

        let mut c = b.deep_copy();
        c.set_context(Some(LogicalFormula::literal(Pred::new("ready"))));
        assert_ne!(b, c);
        assert_ne!(c, b);
    }

    #[test]
    fn test_true_context_is_normalized() {
        let plan = Plan::new(None, achieve("g"), Some(LogicalFormula::True), None);
        assert!(plan.context().is_none());
        assert_eq!(plan, Plan::new(None, achieve("g"), None, None));
    }

    #[test]
    fn test_true_literal_context_is_normalized() {
        let bare = Plan::new(None, achieve("g"), None, None);
        let plan = Plan::new(
            None,
            achieve("g"),
            Some(LogicalFormula::Literal(Pred::new("true"))),
            None,
        );
        assert!(plan.context().is_none());
        assert_eq!(plan.to_string(), "+!g.");
        assert_eq!(plan, bare);
        assert_eq!(crate::parser::parse_plan(&plan.to_string()).unwrap(), plan);

        let mut slotted = bare.deep_copy();
        slotted
            .set_slot(2, PlanSlot::Context(LogicalFormula::Literal(Pred::new("true"))))
            .unwrap();
        assert!(slotted.context().is_none());
        assert_eq!(slotted, bare);
    }

    #[test]
    fn test_copies_drop_registry() {
        let mut plan = labelled(vec![Term::atom("atomic")]);
        plan.set_context(Some(LogicalFormula::literal(Pred::new("ready"))));
        plan.register_conflicting_plan("p9");

        let deep = plan.deep_copy();
        let moved = plan.clone_only_body();
        let substituted = plan.capply(&Unifier::new());
        for copy in [&deep, &moved, &substituted] {
            assert_eq!(copy, &plan);
            assert!(copy.conflicting_plans().is_none());
            assert_eq!(copy.conflicts(), plan.conflicts());
            assert!(copy.is_atomic());
        }

        assert!(moved.shares_label_with(&plan));
        assert!(moved.shares_context_with(&plan));
        assert!(!deep.shares_label_with(&plan));
        assert!(!deep.shares_context_with(&plan));
    }

    #[test]
    fn test_slots() {
        let mut plan = Plan::new(None, achieve("g"), None, None);
        assert_eq!(plan.arity(), 4);
        assert_eq!(plan.slot(0), Some(PlanSlot::Label(Pred::new("nolabel"))));
        assert_eq!(plan.slot(2), Some(PlanSlot::Context(LogicalFormula::True)));
        assert_eq!(plan.slot(4), None);

        plan.set_slot(0, PlanSlot::Label(Pred::new("p").with_annots([Term::atom("atomic")])))
            .unwrap();
        assert!(plan.is_atomic());
        assert!(matches!(
            plan.set_slot(1, PlanSlot::Body(PlanBody::new())),
            Err(SyntaxError::SlotType { index: 1, .. })
        ));
        assert!(matches!(
            plan.set_slot(7, PlanSlot::Body(PlanBody::new())),
            Err(SyntaxError::SlotOutOfRange(7))
        ));
    }

    #[test]
    fn test_anonymous_id_is_stable() {
        let a = Plan::new(None, achieve("g"), None, None);
        let b = a.deep_copy();
        assert!(a.id().starts_with("anon_"));
        assert_eq!(a.id(), b.id());
        assert_eq!(labelled(vec![]).id(), "p1");
    }

    #[test]
    fn test_rendering() {
        let mut plan = labelled(vec![Term::atom("atomic")]);
        assert_eq!(plan.to_string(), "@p1[atomic] +!g.");
        plan.set_as_term(true);
        assert_eq!(plan.to_string(), "{ @p1[atomic] +!g }");
    }
}
