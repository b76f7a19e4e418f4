//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expired-entry sweep: opt-in, reclaims memory held by entries nobody reads again

mod sweep;

pub use sweep::spawn_sweep_task;
