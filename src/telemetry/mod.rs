pub mod http;
pub mod init;
pub mod metrics;

pub use init::init_telemetry;
