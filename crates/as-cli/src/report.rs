//! Check reports in text, JSON and XML form.

use std::fmt::Write as _;

use anyhow::Result;
use as_syntax::{ConflictDescriptor, Element, Plan, ResolutionReport, ToDom};
use serde::Serialize;

use crate::config::OutputFormat;

/// Summary of one checked plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub id: String,
    pub label: Option<String>,
    pub trigger: String,
    pub location: Option<String>,
    pub atomic: bool,
    pub breakpoint: bool,
    pub all_unifs: bool,
    pub conflicts: Vec<ConflictDescriptor>,
    pub conflicting_plans: Vec<String>,
}

impl PlanReport {
    pub fn from_plan(plan: &Plan) -> Self {
        let mut conflicts: Vec<_> = plan.conflicts().iter().cloned().collect();
        conflicts.sort_by(|a, b| (a.kind() as u8, a.key()).cmp(&(b.kind() as u8, b.key())));
        let mut conflicting_plans: Vec<_> = plan
            .conflicting_plans()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        conflicting_plans.sort();

        Self {
            id: plan.id(),
            label: plan.label().map(|l| l.to_string()),
            trigger: plan.trigger().to_string(),
            location: plan.src_info().map(|s| s.to_string()),
            atomic: plan.is_atomic(),
            breakpoint: plan.has_breakpoint(),
            all_unifs: plan.is_all_unifs(),
            conflicts,
            conflicting_plans,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub plans: Vec<PlanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionReport>,
}

impl CheckReport {
    pub fn new(plans: &[Plan], resolution: Option<ResolutionReport>) -> Self {
        Self {
            plans: plans.iter().map(PlanReport::from_plan).collect(),
            resolution,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for plan in &self.plans {
            let location = plan.location.as_deref().unwrap_or("-");
            let _ = writeln!(out, "{} {} ({})", plan.id, plan.trigger, location);
            let flags: Vec<&str> = [
                (plan.atomic, "atomic"),
                (plan.breakpoint, "breakpoint"),
                (plan.all_unifs, "all_unifs"),
            ]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect();
            if !flags.is_empty() {
                let _ = writeln!(out, "  flags: {}", flags.join(", "));
            }
            for descriptor in &plan.conflicts {
                let _ = writeln!(out, "  declares {}", descriptor);
            }
            if !plan.conflicting_plans.is_empty() {
                let _ = writeln!(out, "  conflicts with {}", plan.conflicting_plans.join(", "));
            }
        }
        if let Some(resolution) = &self.resolution {
            let _ = writeln!(
                out,
                "{} plans checked, {} conflicting pairs",
                resolution.checked,
                resolution.conflicts.len()
            );
        }
        out
    }
}

/// Structured document of a whole plan library
pub fn plans_document(plans: &[Plan]) -> Element {
    plans
        .iter()
        .fold(Element::new("plans"), |doc, plan| doc.child(plan.to_dom()))
}

pub fn render(plans: &[Plan], resolution: Option<ResolutionReport>, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => CheckReport::new(plans, resolution).render_text(),
        OutputFormat::Json => serde_json::to_string_pretty(&CheckReport::new(plans, resolution))?,
        OutputFormat::Xml => plans_document(plans).to_xml()?,
    })
}
