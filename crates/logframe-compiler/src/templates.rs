//! Per-type narrative templates.
//!
//! Placeholders are `{field}` names from the type's toolbox schema, plus
//! `{label}` for the node label. The table is versioned together with the
//! toolbox catalogs.

use lazy_static::lazy_static;
use logframe_core::{DecodedAttributes, Node, ToolboxRegistry};
use regex::{Captures, Regex};

pub const TEMPLATE_VERSION: &str = "2024.2";

/// Text for one tier of the framework.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub narrative: &'static str,
    /// Representative indicator, used for outputs.
    pub indicator: Option<&'static str>,
    pub verification: &'static [&'static str],
}

const fn tier(narrative: &'static str, verification: &'static [&'static str]) -> Tier {
    Tier {
        narrative,
        indicator: None,
        verification,
    }
}

const fn measured(
    narrative: &'static str,
    indicator: &'static str,
    verification: &'static [&'static str],
) -> Tier {
    Tier {
        narrative,
        indicator: Some(indicator),
        verification,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeTemplate {
    pub type_id: &'static str,
    pub goal: Option<Tier>,
    pub outcome: Option<Tier>,
    pub output: Option<Tier>,
    pub activity: Option<Tier>,
}

const NONE: TypeTemplate = TypeTemplate {
    type_id: "",
    goal: None,
    outcome: None,
    output: None,
    activity: None,
};

const fn goal(type_id: &'static str, narrative: Tier) -> TypeTemplate {
    TypeTemplate {
        type_id,
        goal: Some(narrative),
        outcome: Some(narrative),
        ..NONE
    }
}

const fn outcome(type_id: &'static str, narrative: Tier) -> TypeTemplate {
    TypeTemplate {
        type_id,
        outcome: Some(narrative),
        ..NONE
    }
}

const fn intervention(type_id: &'static str, output: Tier, activity: Tier) -> TypeTemplate {
    TypeTemplate {
        type_id,
        output: Some(output),
        activity: Some(activity),
        ..NONE
    }
}

const SCHOOL_RECORDS: &[&str] = &["School records", "CRCC visit reports"];
const PROGRAM_RECORDS: &[&str] = &["Programme MIS", "Field monitoring reports"];
const PROCUREMENT: &[&str] = &["Procurement and distribution records"];
const TRAINING_RECORDS: &[&str] = &["Training attendance sheets", "Trainer reports"];
const PLACEMENT_RECORDS: &[&str] = &["Placement tracker", "Employer confirmation letters"];
const TRACER: &[&str] = &["Tracer study of graduates", "Income self-report survey"];

pub static TEMPLATES: &[TypeTemplate] = &[
    // Coarse types
    goal("goal", tier("{label}", PROGRAM_RECORDS)),
    goal("vision", tier("{label}", PROGRAM_RECORDS)),
    outcome("outcome", tier("{label}", PROGRAM_RECORDS)),
    outcome("bridge", tier("{label}", PROGRAM_RECORDS)),
    intervention(
        "intervention",
        measured("{label} delivered", "{label} completion rate", PROGRAM_RECORDS),
        tier("Plan and carry out {label}", PROGRAM_RECORDS),
    ),
    intervention(
        "activity",
        measured("{label} delivered", "{label} completion rate", PROGRAM_RECORDS),
        tier("Plan and carry out {label}", PROGRAM_RECORDS),
    ),
    // Foundational literacy and numeracy
    goal(
        "vision_goal",
        tier(
            "{statement}",
            &["State achievement survey", "Block-level learning assessment results"],
        ),
    ),
    outcome(
        "learning_outcome",
        tier(
            "{target_percentage}% of grade {grade} children achieve {competency}",
            &["Learning assessment results", "Sample-based external assessment"],
        ),
    ),
    outcome(
        "practice_shift",
        tier(
            "{label}: classrooms move from {from_behavior} to {to_behavior}",
            &["Classroom observation tool", "CRCC visit reports"],
        ),
    ),
    outcome(
        "adoption_signal",
        tier("{label}: {observable_change}", &["Classroom observation tool"]),
    ),
    intervention(
        "tlm_kit",
        measured(
            "{quantity} {kit_type} kits available in classrooms",
            "% of classrooms using {kit_type} kits daily",
            SCHOOL_RECORDS,
        ),
        tier("Procure and distribute {kit_type} kits to schools", PROCUREMENT),
    ),
    intervention(
        "teacher_training",
        measured(
            "Teachers trained through {duration_days}-day {mode} training",
            "% of teachers completing {mode} training",
            TRAINING_RECORDS,
        ),
        tier("Design and deliver {mode} teacher training", TRAINING_RECORDS),
    ),
    intervention(
        "classroom_coaching",
        measured(
            "Teachers receive {visits_per_month} coaching visits per month",
            "Coaching visits completed per teacher per month",
            &["Coaching visit logs"],
        ),
        tier("Schedule and conduct classroom coaching by {coach_role}", &["Coaching visit logs"]),
    ),
    intervention(
        "reading_campaign",
        measured(
            "{duration_weeks}-week reading campaign run with {volunteers} volunteers",
            "Children taking part in the reading campaign",
            &["Campaign attendance registers"],
        ),
        tier(
            "Mobilise volunteers and launch the reading campaign on {start_date}",
            &["Volunteer rosters"],
        ),
    ),
    intervention(
        "assessment_cycle",
        measured(
            "{rounds_per_year} rounds of {tool} assessment held each year",
            "% of schools completing each {tool} round",
            &["Assessment data portal"],
        ),
        tier("Administer {tool} assessments and share results with schools", &["Assessment data portal"]),
    ),
    // Career readiness
    goal(
        "sustainable_income",
        tier("Young people earn a sustainable monthly income of {monthly_income_target}", TRACER),
    ),
    goal(
        "self_employment",
        tier("Young people run viable {enterprise_type} enterprises", TRACER),
    ),
    outcome(
        "job_placement",
        tier("{placement_rate}% of trained youth placed in {sector} jobs", PLACEMENT_RECORDS),
    ),
    outcome(
        "skill_certification",
        tier("Youth certified by {certifying_body}", &["Certification results"]),
    ),
    outcome(
        "mindset_shift",
        tier("{label}: youth move from {from_behavior} to {to_behavior}", &["Mentor assessments"]),
    ),
    outcome(
        "work_readiness",
        tier("Youth demonstrate work readiness: {competencies}", &["Work readiness assessment"]),
    ),
    intervention(
        "skill_training",
        measured(
            "Youth trained in {trade} over {duration_weeks} weeks",
            "% of enrolled youth completing {trade} training",
            TRAINING_RECORDS,
        ),
        tier("Mobilise the cohort and run {trade} training", TRAINING_RECORDS),
    ),
    intervention(
        "career_counselling",
        measured(
            "{sessions} career counselling sessions delivered",
            "Youth with a documented career plan",
            &["Counselling records"],
        ),
        tier("Conduct {format} career counselling", &["Counselling records"]),
    ),
    intervention(
        "apprenticeship",
        measured(
            "{duration_months}-month apprenticeships arranged",
            "% of apprentices completing their placement",
            PLACEMENT_RECORDS,
        ),
        tier("Negotiate apprenticeship places with employers (stipend: {stipend})", PLACEMENT_RECORDS),
    ),
    intervention(
        "industry_linkage",
        measured(
            "Linkages established with {partner_count} industry partners",
            "Signed partner agreements",
            &["Partnership agreements"],
        ),
        tier("Map local employers and formalise partnerships", &["Partnership agreements"]),
    ),
    intervention(
        "enterprise_incubation",
        measured(
            "Incubation support provided to a cohort of {cohort_size}",
            "Enterprises still trading after six months",
            TRACER,
        ),
        tier("Run incubation support (seed grant: {seed_grant})", &["Incubation case files"]),
    ),
];

pub fn template_for(type_id: &str) -> Option<&'static TypeTemplate> {
    TEMPLATES.iter().find(|t| t.type_id == type_id)
}

/// Node types that produce output and activity cells.
pub fn has_deliverable(type_id: &str) -> bool {
    template_for(type_id).map_or(false, |t| t.output.is_some())
}

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z_]+)\}").unwrap();
}

/// Fill a template from a node's decoded attributes.
///
/// Missing values render as `[Field label]` so gaps stay visible in the
/// document.
pub fn render(template: &str, node: &Node, attributes: Option<&DecodedAttributes>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            if name == "label" {
                return node_label(node).to_string();
            }
            attributes
                .and_then(|attrs| attrs.display(name))
                .unwrap_or_else(|| blank(node, name))
        })
        .trim()
        .to_string()
}

pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn node_label(node: &Node) -> &str {
    if node.label.trim().is_empty() {
        &node.id
    } else {
        node.label.trim()
    }
}

fn blank(node: &Node, field: &str) -> String {
    let label = ToolboxRegistry::find(&node.node_type)
        .and_then(|(_, item)| item.field(field))
        .map(|spec| spec.label)
        .unwrap_or(field);
    format!("[{}]", label)
}
