//! Command implementations

pub mod completions;
pub mod service_worker;
