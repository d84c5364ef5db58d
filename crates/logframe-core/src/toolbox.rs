//! Static per-domain catalogs of node types.
//!
//! The registry is the single source of truth for which node types exist in
//! a domain, which category they belong to and which form fields they carry.
//! The authoring UI renders configuration forms from it, the simulator uses
//! it to resolve node roles and the compiler keys its narrative templates on
//! the same ids. Bump [`TOOLBOX_VERSION`] whenever an entry changes; the
//! compiler's template table carries the matching version.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::{Domain, Node, NodeCategory, NodeId};

pub const TOOLBOX_VERSION: &str = "2024.2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Boolean,
    Date,
    Textarea,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    pub required: bool,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            name,
            label,
            field_type,
            options: &[],
            required,
        }
    }

    const fn text(name: &'static str, label: &'static str, required: bool) -> Self {
        Self::new(name, label, FieldType::Text, required)
    }

    const fn textarea(name: &'static str, label: &'static str, required: bool) -> Self {
        Self::new(name, label, FieldType::Textarea, required)
    }

    const fn number(name: &'static str, label: &'static str, required: bool) -> Self {
        Self::new(name, label, FieldType::Number, required)
    }

    const fn boolean(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldType::Boolean, false)
    }

    const fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldType::Date, false)
    }

    const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        required: bool,
    ) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Select,
            options,
            required,
        }
    }
}

/// Marks toolbox entries that stand for a tier of the framework rather
/// than for an actor or an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Goal,
    Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolboxItem {
    pub id: &'static str,
    pub label: &'static str,
    pub category: NodeCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    pub fields: &'static [FieldSpec],
}

impl ToolboxItem {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const LEVELS: &[&str] = &["low", "medium", "high"];

const MITIGATION: FieldSpec = FieldSpec::textarea("mitigation_plan", "Mitigation plan", false);

static FLN_TOOLBOX: &[ToolboxItem] = &[
    // Foundation
    ToolboxItem {
        id: "vision_goal",
        label: "Vision / Goal",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Goal),
        fields: &[
            FieldSpec::textarea("statement", "Vision statement", true),
            FieldSpec::number("target_year", "Target year", false),
            FieldSpec::text("geography", "Geography", false),
        ],
    },
    ToolboxItem {
        id: "learning_outcome",
        label: "Learning Outcome",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Outcome),
        fields: &[
            FieldSpec::select(
                "competency",
                "Competency",
                &[
                    "oral_reading_fluency",
                    "reading_comprehension",
                    "early_numeracy",
                    "writing",
                ],
                true,
            ),
            FieldSpec::number("target_percentage", "Target (% of children)", false),
            FieldSpec::select("grade", "Grade", &["1", "2", "3"], false),
        ],
    },
    // Stakeholders
    ToolboxItem {
        id: "teacher",
        label: "Teacher",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[
            FieldSpec::number("teacher_count", "Number of teachers", false),
            FieldSpec::select("bandwidth", "Bandwidth", LEVELS, false),
        ],
    },
    ToolboxItem {
        id: "head_teacher",
        label: "Head Teacher",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[FieldSpec::number("school_count", "Schools", false)],
    },
    ToolboxItem {
        id: "crcc",
        label: "Cluster Resource Centre Coordinator",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[
            FieldSpec::number("schools_covered", "Schools covered", false),
            FieldSpec::select(
                "visit_frequency",
                "Visit frequency",
                &["weekly", "fortnightly", "monthly"],
                false,
            ),
        ],
    },
    ToolboxItem {
        id: "beo",
        label: "Block Education Officer",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[FieldSpec::text("block_name", "Block", true)],
    },
    ToolboxItem {
        id: "smc",
        label: "School Management Committee",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[FieldSpec::select(
            "meeting_frequency",
            "Meeting frequency",
            &["monthly", "quarterly"],
            false,
        )],
    },
    // Interventions
    ToolboxItem {
        id: "tlm_kit",
        label: "TLM Kit",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::select(
                "kit_type",
                "Kit type",
                &["reading_cards", "number_kit", "storybooks", "mixed"],
                true,
            ),
            FieldSpec::number("quantity", "Quantity", false),
            FieldSpec::select("cost_level", "Cost level", LEVELS, false),
        ],
    },
    ToolboxItem {
        id: "teacher_training",
        label: "Teacher Training",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::select("mode", "Mode", &["in_person", "blended", "digital"], true),
            FieldSpec::number("duration_days", "Duration (days)", false),
            FieldSpec::select("complexity", "Complexity", LEVELS, false),
        ],
    },
    ToolboxItem {
        id: "classroom_coaching",
        label: "Classroom Coaching",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::number("visits_per_month", "Visits per month", false),
            FieldSpec::text("coach_role", "Coach", false),
        ],
    },
    ToolboxItem {
        id: "reading_campaign",
        label: "Community Reading Campaign",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::number("duration_weeks", "Duration (weeks)", false),
            FieldSpec::number("volunteers", "Volunteers", false),
            FieldSpec::date("start_date", "Start date"),
        ],
    },
    ToolboxItem {
        id: "assessment_cycle",
        label: "Learning Assessment Cycle",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::select("tool", "Assessment tool", &["aser", "orf", "custom"], true),
            FieldSpec::number("rounds_per_year", "Rounds per year", false),
        ],
    },
    // Bridges
    ToolboxItem {
        id: "practice_shift",
        label: "Practice Shift",
        category: NodeCategory::Bridge,
        marker: None,
        fields: &[
            FieldSpec::text("from_behavior", "Current practice", true),
            FieldSpec::text("to_behavior", "Desired practice", true),
            FieldSpec::text("actor", "Who changes", false),
        ],
    },
    ToolboxItem {
        id: "adoption_signal",
        label: "Adoption Signal",
        category: NodeCategory::Bridge,
        marker: None,
        fields: &[FieldSpec::textarea(
            "observable_change",
            "Observable change",
            true,
        )],
    },
    // Risks
    ToolboxItem {
        id: "implementation_risk",
        label: "Implementation Risk",
        category: NodeCategory::Risk,
        marker: None,
        fields: &[
            FieldSpec::select("likelihood", "Likelihood", LEVELS, false),
            FieldSpec::select("impact", "Impact", LEVELS, false),
            MITIGATION,
        ],
    },
    ToolboxItem {
        id: "attendance_risk",
        label: "Attendance Risk",
        category: NodeCategory::Risk,
        marker: None,
        fields: &[FieldSpec::text("season", "Season", false), MITIGATION],
    },
];

static CAREER_TOOLBOX: &[ToolboxItem] = &[
    // Foundation
    ToolboxItem {
        id: "sustainable_income",
        label: "Sustainable Income",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Goal),
        fields: &[
            FieldSpec::number("monthly_income_target", "Monthly income target", true),
            FieldSpec::number("target_year", "Target year", false),
        ],
    },
    ToolboxItem {
        id: "self_employment",
        label: "Self Employment",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Goal),
        fields: &[
            FieldSpec::select(
                "enterprise_type",
                "Enterprise type",
                &["retail", "services", "agri", "manufacturing", "digital"],
                true,
            ),
            FieldSpec::number("target_year", "Target year", false),
        ],
    },
    ToolboxItem {
        id: "job_placement",
        label: "Job Placement",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Outcome),
        fields: &[
            FieldSpec::number("placement_rate", "Placement rate (%)", false),
            FieldSpec::text("sector", "Sector", false),
        ],
    },
    ToolboxItem {
        id: "skill_certification",
        label: "Skill Certification",
        category: NodeCategory::Foundation,
        marker: Some(Marker::Outcome),
        fields: &[
            FieldSpec::text("certifying_body", "Certifying body", true),
            FieldSpec::number("pass_rate", "Pass rate (%)", false),
        ],
    },
    // Stakeholders
    ToolboxItem {
        id: "youth_cohort",
        label: "Youth Cohort",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[
            FieldSpec::number("cohort_size", "Cohort size", true),
            FieldSpec::select("age_band", "Age band", &["15-18", "18-24", "25-29"], false),
        ],
    },
    ToolboxItem {
        id: "employer",
        label: "Employer",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[
            FieldSpec::text("sector", "Sector", false),
            FieldSpec::number("openings", "Openings", false),
        ],
    },
    ToolboxItem {
        id: "mentor",
        label: "Mentor",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[FieldSpec::number("mentees_per_mentor", "Mentees per mentor", false)],
    },
    ToolboxItem {
        id: "placement_officer",
        label: "Placement Officer",
        category: NodeCategory::Stakeholder,
        marker: None,
        fields: &[FieldSpec::number("districts", "Districts", false)],
    },
    // Interventions
    ToolboxItem {
        id: "skill_training",
        label: "Skill Training",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::text("trade", "Trade", true),
            FieldSpec::number("duration_weeks", "Duration (weeks)", false),
            FieldSpec::select("cost_level", "Cost level", LEVELS, false),
        ],
    },
    ToolboxItem {
        id: "career_counselling",
        label: "Career Counselling",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::number("sessions", "Sessions", false),
            FieldSpec::select("format", "Format", &["individual", "group"], false),
        ],
    },
    ToolboxItem {
        id: "apprenticeship",
        label: "Apprenticeship",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::number("duration_months", "Duration (months)", false),
            FieldSpec::boolean("stipend", "Stipend paid"),
        ],
    },
    ToolboxItem {
        id: "industry_linkage",
        label: "Industry Linkage",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[FieldSpec::number("partner_count", "Industry partners", false)],
    },
    ToolboxItem {
        id: "enterprise_incubation",
        label: "Enterprise Incubation",
        category: NodeCategory::Intervention,
        marker: None,
        fields: &[
            FieldSpec::boolean("seed_grant", "Seed grant"),
            FieldSpec::number("cohort_size", "Cohort size", false),
        ],
    },
    // Bridges
    ToolboxItem {
        id: "mindset_shift",
        label: "Mindset Shift",
        category: NodeCategory::Bridge,
        marker: None,
        fields: &[
            FieldSpec::text("from_behavior", "Current mindset", true),
            FieldSpec::text("to_behavior", "Desired mindset", true),
        ],
    },
    ToolboxItem {
        id: "work_readiness",
        label: "Work Readiness",
        category: NodeCategory::Bridge,
        marker: None,
        fields: &[FieldSpec::textarea("competencies", "Competencies", false)],
    },
    // Risks
    ToolboxItem {
        id: "dropout_risk",
        label: "Dropout Risk",
        category: NodeCategory::Risk,
        marker: None,
        fields: &[
            FieldSpec::select("likelihood", "Likelihood", LEVELS, false),
            MITIGATION,
        ],
    },
    ToolboxItem {
        id: "market_risk",
        label: "Market Risk",
        category: NodeCategory::Risk,
        marker: None,
        fields: &[FieldSpec::text("sector", "Sector", false), MITIGATION],
    },
];

static INDEX: Lazy<HashMap<&'static str, (Domain, &'static ToolboxItem)>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for domain in [Domain::Fln, Domain::CareerReadiness] {
        for item in ToolboxRegistry::items(domain) {
            index.entry(item.id).or_insert((domain, item));
        }
    }
    index
});

/// Read-only lookup over the static catalogs.
pub struct ToolboxRegistry;

impl ToolboxRegistry {
    pub fn items(domain: Domain) -> &'static [ToolboxItem] {
        match domain {
            Domain::Fln => FLN_TOOLBOX,
            Domain::CareerReadiness => CAREER_TOOLBOX,
        }
    }

    pub fn lookup(domain: Domain, id: &str) -> Option<&'static ToolboxItem> {
        Self::items(domain).iter().find(|item| item.id == id)
    }

    /// Find a type id in any domain. Ids are unique across domains.
    pub fn find(id: &str) -> Option<(Domain, &'static ToolboxItem)> {
        INDEX.get(id).copied()
    }

    pub fn by_category(domain: Domain, category: NodeCategory) -> Vec<&'static ToolboxItem> {
        Self::items(domain)
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    pub fn with_marker(domain: Domain, marker: Marker) -> Vec<&'static ToolboxItem> {
        Self::items(domain)
            .iter()
            .filter(|item| item.marker == Some(marker))
            .collect()
    }

    /// Decode a node's raw attributes against its toolbox schema.
    ///
    /// Well-typed values are kept, malformed ones are dropped and reported
    /// as issues. Types without a toolbox entry (coarse types and custom
    /// types) are decoded leniently and never produce issues. Attributes the
    /// schema does not declare are kept when they have a scalar value.
    pub fn decode_attributes(node: &Node) -> DecodedAttributes {
        let mut decoded = DecodedAttributes::default();
        let item = Self::find(&node.node_type).map(|(_, item)| item);

        if let Some(item) = item {
            for spec in item.fields {
                match node.attributes.get(spec.name).filter(|v| !is_blank(v)) {
                    None => {
                        if spec.required {
                            decoded.issues.push(AttributeIssue {
                                node_id: node.id.clone(),
                                field: spec.name.to_string(),
                                kind: AttributeIssueKind::Missing,
                            });
                        }
                    }
                    Some(raw) => match decode_field(spec, raw) {
                        Ok(value) => {
                            decoded.values.insert(spec.name.to_string(), value);
                        }
                        Err(kind) => decoded.issues.push(AttributeIssue {
                            node_id: node.id.clone(),
                            field: spec.name.to_string(),
                            kind,
                        }),
                    },
                }
            }
        }

        for (name, raw) in &node.attributes {
            let declared = item.map_or(false, |item| item.field(name).is_some());
            if declared || is_blank(raw) {
                continue;
            }
            if let Some(value) = decode_lenient(raw) {
                decoded.values.insert(name.clone(), value);
            }
        }

        decoded
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn decode_lenient(raw: &serde_json::Value) -> Option<FieldValue> {
    match raw {
        serde_json::Value::String(s) => Some(FieldValue::Text(s.trim().to_string())),
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        _ => None,
    }
}

fn decode_field(
    spec: &FieldSpec,
    raw: &serde_json::Value,
) -> std::result::Result<FieldValue, AttributeIssueKind> {
    use serde_json::Value;

    let wrong_type = || AttributeIssueKind::WrongType {
        expected: spec.field_type,
    };

    match spec.field_type {
        FieldType::Text | FieldType::Textarea => match raw {
            Value::String(s) => Ok(FieldValue::Text(s.trim().to_string())),
            Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
            _ => Err(wrong_type()),
        },
        FieldType::Number => match raw {
            Value::Number(n) => n.as_f64().map(FieldValue::Number).ok_or_else(wrong_type),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| wrong_type()),
            _ => Err(wrong_type()),
        },
        FieldType::Select => {
            let value = match raw {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return Err(wrong_type()),
            };
            if spec.options.contains(&value.as_str()) {
                Ok(FieldValue::Choice(value))
            } else {
                Err(AttributeIssueKind::NotAnOption { value })
            }
        }
        FieldType::Boolean => match raw {
            Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" => Ok(FieldValue::Boolean(true)),
                "false" | "no" => Ok(FieldValue::Boolean(false)),
                _ => Err(wrong_type()),
            },
            _ => Err(wrong_type()),
        },
        FieldType::Date => match raw {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(|_| FieldValue::Text(s.trim().to_string()))
                .map_err(|_| wrong_type()),
            _ => Err(wrong_type()),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// One of a select field's option ids, e.g. `reading_comprehension`.
    Choice(String),
    Number(f64),
    Boolean(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Choice(s) => write!(f, "{}", s.replace('_', " ")),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Boolean(true) => write!(f, "yes"),
            FieldValue::Boolean(false) => write!(f, "no"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeIssueKind {
    Missing,
    WrongType { expected: FieldType },
    NotAnOption { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeIssue {
    pub node_id: NodeId,
    pub field: String,
    #[serde(flatten)]
    pub kind: AttributeIssueKind,
}

impl fmt::Display for AttributeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AttributeIssueKind::Missing => {
                write!(f, "{}: required field '{}' is missing", self.node_id, self.field)
            }
            AttributeIssueKind::WrongType { expected } => write!(
                f,
                "{}: field '{}' is not a valid {:?}",
                self.node_id, self.field, expected
            ),
            AttributeIssueKind::NotAnOption { value } => write!(
                f,
                "{}: '{}' is not an allowed value for '{}'",
                self.node_id, value, self.field
            ),
        }
    }
}

/// Typed attribute values of one node plus whatever failed to decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAttributes {
    values: BTreeMap<String, FieldValue>,
    pub issues: Vec<AttributeIssue>,
}

impl DecodedAttributes {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    /// Human-readable rendering of a value, for narrative templates.
    pub fn display(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_ids_are_unique_across_domains() {
        let total = ToolboxRegistry::items(Domain::Fln).len()
            + ToolboxRegistry::items(Domain::CareerReadiness).len();
        assert_eq!(INDEX.len(), total);
    }

    #[test]
    fn test_every_domain_covers_every_category() {
        for domain in [Domain::Fln, Domain::CareerReadiness] {
            for category in NodeCategory::ALL {
                assert!(
                    !ToolboxRegistry::by_category(domain, category).is_empty(),
                    "{} has no {} entries",
                    domain,
                    category
                );
            }
            assert!(!ToolboxRegistry::with_marker(domain, Marker::Goal).is_empty());
        }
    }

    #[test]
    fn test_select_fields_declare_options() {
        for domain in [Domain::Fln, Domain::CareerReadiness] {
            for item in ToolboxRegistry::items(domain) {
                for field in item.fields {
                    assert_eq!(
                        field.field_type == FieldType::Select,
                        !field.options.is_empty(),
                        "{}.{}",
                        item.id,
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_decode_keeps_valid_and_reports_malformed() {
        let node = Node::new("n1", "tlm_kit", NodeCategory::Intervention, "Kits")
            .with_attribute("kit_type", json!("storybooks"))
            .with_attribute("quantity", json!("forty"))
            .with_attribute("cost_level", json!("astronomical"))
            .with_attribute("supplier", json!("Pratham Books"));

        let decoded = ToolboxRegistry::decode_attributes(&node);

        assert_eq!(decoded.text("kit_type"), Some("storybooks"));
        assert_eq!(decoded.number("quantity"), None);
        assert_eq!(decoded.text("cost_level"), None);
        assert_eq!(decoded.text("supplier"), Some("Pratham Books"));
        assert_eq!(decoded.issues.len(), 2);
        assert!(matches!(
            decoded.issues[1].kind,
            AttributeIssueKind::NotAnOption { .. }
        ));
    }

    #[test]
    fn test_decode_reports_missing_required_fields() {
        let node = Node::new("p1", "practice_shift", NodeCategory::Bridge, "Shift")
            .with_attribute("from_behavior", json!("rote recitation"))
            .with_attribute("to_behavior", json!("   "));

        let decoded = ToolboxRegistry::decode_attributes(&node);
        assert_eq!(decoded.issues.len(), 1);
        assert_eq!(decoded.issues[0].field, "to_behavior");
        assert_eq!(decoded.issues[0].kind, AttributeIssueKind::Missing);
    }

    #[test]
    fn test_decode_coerces_numeric_strings_and_dates() {
        let node = Node::new("r1", "reading_campaign", NodeCategory::Intervention, "Camp")
            .with_attribute("duration_weeks", json!("6"))
            .with_attribute("start_date", json!("2025-07-01"));
        let decoded = ToolboxRegistry::decode_attributes(&node);
        assert!(decoded.is_valid());
        assert_eq!(decoded.number("duration_weeks"), Some(6.0));
        assert_eq!(decoded.display("duration_weeks").as_deref(), Some("6"));

        let bad = Node::new("r2", "reading_campaign", NodeCategory::Intervention, "Camp")
            .with_attribute("start_date", json!("next monsoon"));
        assert_eq!(ToolboxRegistry::decode_attributes(&bad).issues.len(), 1);
    }

    #[test]
    fn test_unknown_types_decode_leniently() {
        let node = Node::new("x", "intervention", NodeCategory::Intervention, "Custom")
            .with_attribute("budget", json!(1200))
            .with_attribute("tags", json!(["a", "b"]));
        let decoded = ToolboxRegistry::decode_attributes(&node);
        assert!(decoded.is_valid());
        assert_eq!(decoded.number("budget"), Some(1200.0));
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_only_select_values_are_humanized() {
        let outcome = Node::new("lo", "learning_outcome", NodeCategory::Foundation, "Reading")
            .with_attribute("competency", json!("oral_reading_fluency"));
        let decoded = ToolboxRegistry::decode_attributes(&outcome);
        assert_eq!(decoded.text("competency"), Some("oral_reading_fluency"));
        assert_eq!(
            decoded.display("competency").as_deref(),
            Some("oral reading fluency")
        );

        let shift = Node::new("p1", "practice_shift", NodeCategory::Bridge, "Shift")
            .with_attribute("from_behavior", json!("copy_from_board"))
            .with_attribute("to_behavior", json!("peer_reading"));
        let decoded = ToolboxRegistry::decode_attributes(&shift);
        assert_eq!(decoded.display("from_behavior").as_deref(), Some("copy_from_board"));
        assert_eq!(decoded.display("to_behavior").as_deref(), Some("peer_reading"));
    }
}
