pub mod coerce;
pub mod enhance;
pub mod model;
pub mod sample;
pub mod sections;

pub use enhance::{enhance, enhance_at};
pub use model::Report;
pub use sample::SampleReport;
