//! GDB Machine Interface (MI) Record Module

pub mod classifier;
pub mod error;
pub mod parser;
pub mod render;
pub mod types;

pub use classifier::RecordClassifier;
pub use error::{Expected, MiError, Result};
pub use parser::MiParser;
pub use types::*;
