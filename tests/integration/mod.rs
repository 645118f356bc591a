//! Integration test modules for Cantus
//!
//! - dispatch: request routing, default-model policy, parameter validation
//! - warmup: startup and background loading behavior
//! - listing: catalog listing with load status

pub mod listing;
pub mod warmup;
