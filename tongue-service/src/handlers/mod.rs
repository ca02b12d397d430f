//! HTTP handlers for the tongue diagnosis workbench.

pub mod diagnosis;
pub mod error;
pub mod health;
pub mod image;
pub mod metrics;
pub mod report;
pub mod session;
pub mod workbench;
