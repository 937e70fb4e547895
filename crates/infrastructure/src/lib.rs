// Corvus DB Platform - Infrastructure Layer
// Concrete adapters for the domain ports
// Modules:
// - repositories: in-memory task-record and alert-definition stores
// - catalogs: static pricing / instance-type catalogs, alerting-config store
// - agents: in-memory cluster agent
// - directory: in-memory universe directory

pub mod agents;
pub mod catalogs;
pub mod directory;
pub mod repositories;

#[cfg(test)]
mod tests;

pub use agents::*;
pub use catalogs::*;
pub use directory::*;
pub use repositories::*;
