pub mod engine;

pub use engine::{Evaluation, LogframeEngine};
