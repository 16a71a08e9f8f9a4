pub mod generate;
pub mod orchestrator;

pub use generate::{GenerationSettings, Subject};
pub use orchestrator::{CreatedReport, ReportRequest, SavedReport, create_report, load_saved_report};
