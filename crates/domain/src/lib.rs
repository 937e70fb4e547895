// Corvus DB Platform - Domain Layer
// Bounded Contexts:
// - tasks: TaskRecord aggregate, subtask graph, progress snapshots
// - alerts: alert template catalog, alert definitions, alerting configuration
// - universe: topology model, cluster agent port, resource/cost aggregation

pub mod alerts;
pub mod error;
pub mod tasks;
pub mod universe;

pub use alerts::*;
pub use error::*;
pub use tasks::*;
pub use universe::*;
