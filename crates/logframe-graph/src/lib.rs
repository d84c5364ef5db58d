pub mod grammar;
pub mod graph;
pub mod roles;
pub mod structural;
pub mod traversal;

pub use grammar::*;
pub use graph::*;
pub use roles::*;
pub use structural::*;
pub use traversal::{BfsIterator, Direction, TraversalConfig};
