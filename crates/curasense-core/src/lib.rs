//! Curasense domain layer: shared error type, analysis report schemas,
//! session document context and AI configuration.

pub mod config;
pub mod error;
pub mod report;
pub mod session;

// Re-export common types
pub use config::AiConfig;
pub use error::{CuraError, Result};
pub use report::{ImagingReport, TextReport};
pub use session::{ContextSlot, DocumentContext};
