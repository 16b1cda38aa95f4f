//! Enum generation: column inference, templates and the run driver

pub mod inference;
mod orchestrator;
mod spec;
pub mod template;
mod writer;

pub use orchestrator::*;
pub use spec::*;
pub use template::{GenerationMeta, RustEnumTemplate, TemplateEngine, TemplateRenderer};
pub use writer::*;
