use anyhow::Result;
use colored::Colorize;
use logframe_ai::AuditReport;
use logframe_core::{FrameworkCell, LfaDocument, LogicError, Severity, ToolboxItem};
use logframe_engine::Evaluation;
use logframe_graph::{IntegrityReport, StructuralReport};
use logframe_sim::{HealthStatus, SimulationResult};
use serde::Serialize;

/// Result of one command, printed as JSON or as colored text.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Report {
    Structural {
        structural: StructuralReport,
        integrity: IntegrityReport,
    },
    Simulation(SimulationResult),
    Document(LfaDocument),
    Evaluation(Box<Evaluation>),
    Audit(AuditReport),
    Toolbox(Vec<&'static ToolboxItem>),
    Message { message: String },
}

pub fn print_json(report: &Report) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_pretty(report: &Report) {
    match report {
        Report::Structural {
            structural,
            integrity,
        } => {
            print_flag("Cycle", structural.has_cycle);
            print_flag("Fragmented", structural.is_fragmented);
            print_integrity(integrity);
            print_errors(&structural.errors);
        }
        Report::Simulation(result) => print_simulation(result),
        Report::Document(document) => print_document(document),
        Report::Evaluation(evaluation) => {
            println!("{}: {}", "Strategy".cyan().bold(), evaluation.strategy);
            print_integrity(&evaluation.integrity);
            print_simulation_header(&evaluation.simulation);
            print_errors(&evaluation.errors);
            match &evaluation.document {
                Some(document) => {
                    println!();
                    print_document(document);
                }
                None => println!(
                    "\n{}",
                    "Logical framework not compiled: fix the issues above first.".yellow()
                ),
            }
        }
        Report::Audit(audit) => print_audit(audit),
        Report::Toolbox(items) => {
            for item in items {
                println!(
                    "{} {} ({})",
                    item.id.cyan().bold(),
                    item.label,
                    item.category.to_string().dimmed()
                );
                for field in item.fields {
                    let required = if field.required { "*" } else { "" };
                    println!("    {}{} : {:?}", field.name, required.red(), field.field_type);
                }
            }
        }
        Report::Message { message } => println!("{}", message.green()),
    }
}

fn print_flag(name: &str, value: bool) {
    let shown = if value { "yes".red() } else { "no".green() };
    println!("{}: {}", name.cyan().bold(), shown);
}

fn print_integrity(integrity: &IntegrityReport) {
    if integrity.is_clean() {
        return;
    }
    for dangling in &integrity.dangling_edges {
        println!(
            "{} edge {} points at missing node(s) {}",
            "skipped:".yellow(),
            dangling.edge_id,
            dangling.missing.join(", ")
        );
    }
    for id in &integrity.duplicate_node_ids {
        println!("{} duplicate node id {}", "skipped:".yellow(), id);
    }
    for id in &integrity.duplicate_edge_ids {
        println!("{} duplicate edge id {}", "skipped:".yellow(), id);
    }
    for id in &integrity.uncategorized_nodes {
        println!("{} node {} has no known category", "uncategorized:".yellow(), id);
    }
    for issue in &integrity.attribute_issues {
        println!("{} {}", "ignored:".yellow(), issue);
    }
}

fn print_simulation_header(result: &SimulationResult) {
    let status = match result.status {
        HealthStatus::Success => result.status.to_string().green().bold(),
        HealthStatus::Warning => result.status.to_string().yellow().bold(),
        HealthStatus::Failure => result.status.to_string().red().bold(),
    };
    println!(
        "{}: {}/100 ({})",
        "Health".cyan().bold(),
        result.score.to_string().bold(),
        status
    );
}

fn print_simulation(result: &SimulationResult) {
    print_simulation_header(result);
    print_errors(&result.errors);
}

fn print_errors(errors: &[LogicError]) {
    if errors.is_empty() {
        println!("{}", "No issues found".green());
        return;
    }
    for error in errors {
        let tag = match error.severity {
            Severity::Critical => "critical".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("[{}] {} {}", tag, error.title.bold(), error.id.dimmed());
        println!("    {}", error.message);
        if !error.fix_suggestion.is_empty() {
            println!("    {} {}", "fix:".green(), error.fix_suggestion);
        }
    }
}

fn print_cell(cell: &FrameworkCell) {
    println!("  {}", cell.narrative.bold());
    for indicator in &cell.indicators {
        println!("    {} {}", "OVI".cyan(), indicator);
    }
    for source in &cell.means_of_verification {
        println!("    {} {}", "MoV".cyan(), source);
    }
    for assumption in &cell.assumptions_risks {
        println!("    {} {}", "Risk".yellow(), assumption);
    }
}

fn print_tier(name: &str, cells: &[FrameworkCell]) {
    println!("{}", name.magenta().bold());
    if cells.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for cell in cells {
        print_cell(cell);
    }
}

fn print_document(document: &LfaDocument) {
    let goal = document.goal.as_ref().map(std::slice::from_ref).unwrap_or(&[]);
    print_tier("Goal", goal);
    print_tier("Outcomes", &document.outcomes);
    print_tier("Outputs", &document.outputs);
    print_tier("Activities", &document.activities);
}

fn print_audit(audit: &AuditReport) {
    println!("{}: {}/100", "Audit score".cyan().bold(), audit.score.to_string().bold());
    if !audit.summary.is_empty() {
        println!("{}", audit.summary);
    }
    for (title, items) in [
        ("Critical gaps", &audit.critical_gaps),
        ("Warnings", &audit.warnings),
        ("Regional insights", &audit.regional_insights),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("{}", title.magenta().bold());
        for item in items {
            println!("  - {}", item);
        }
    }
}
