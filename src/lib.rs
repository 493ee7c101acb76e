//! Fairness-aware daily work allocation.
//!
//! The core (`date_math`, `metrics`, `scheduler`, `state`, `sweep`) is pure
//! and takes the reference time explicitly. `store` and the `routes_*`
//! modules are the persistence and HTTP glue around it.

pub mod app;
pub mod config;
pub mod date_math;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes_plan;
pub mod routes_tasks;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod sweep;

pub use metrics::calculate_task_metrics;
pub use models::{DailySchedule, MetricsView, NextTaskState, ScheduledTask, Task, TaskPatch, TaskStatus};
pub use scheduler::generate_daily_schedule;
pub use state::calculate_next_task_state;
pub use store::{JsonFileStore, TaskStore};
