pub mod kernel;
pub mod report;
