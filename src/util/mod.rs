//! Utility modules

pub mod logging;
pub mod scheduler;
pub mod time;
