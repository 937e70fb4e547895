pub mod agent;
pub mod resources;
pub mod topology;

pub use agent::*;
pub use resources::*;
pub use topology::*;
