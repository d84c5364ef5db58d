pub mod career;
pub mod cells;
pub mod extract;
pub mod fln;
pub mod templates;

pub use career::CareerCompiler;
pub use extract::{incoming_indicators, risk_assumptions};
pub use fln::FlnCompiler;
pub use templates::{template_for, TEMPLATE_VERSION};

use logframe_core::{Domain, LfaDocument};
use logframe_graph::LogicGraph;

/// Deterministic transformation of a design graph into a logical framework.
pub trait CompilationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn compile(&self, graph: &LogicGraph) -> LfaDocument;
}

pub fn strategy_for(domain: Domain) -> Box<dyn CompilationStrategy> {
    match domain {
        Domain::Fln => Box::new(FlnCompiler),
        Domain::CareerReadiness => Box::new(CareerCompiler),
    }
}

pub fn compile(domain: Domain, graph: &LogicGraph) -> LfaDocument {
    strategy_for(domain).compile(graph)
}
