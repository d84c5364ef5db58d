pub mod config_manager;
pub mod diagnostics;
pub mod error;
pub mod lfa;
pub mod toolbox;
pub mod types;

pub use config_manager::*;
pub use diagnostics::*;
pub use error::*;
pub use lfa::*;
pub use toolbox::*;
pub use types::*;
