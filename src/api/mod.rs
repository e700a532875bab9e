//! Simulation API and report output
//!
//! [`Simulation`] is the step-driven handle; [`StepReport`] and the formatters
//! turn its outputs into text, JSON or CSV.

pub mod formatting;
pub mod simulation;
pub mod types;

pub use formatting::{AnchorReport, CsvFormatter, JsonFormatter, ReportWriter, StepReport, TextFormatter};
pub use simulation::Simulation;
pub use types::{OutputFormat, StepOutput};
