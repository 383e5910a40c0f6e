//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - Cache maintenance: sweeps expired entries and idle access patterns

mod maintenance;

pub use maintenance::{spawn_maintenance_task, MaintenanceTask};
