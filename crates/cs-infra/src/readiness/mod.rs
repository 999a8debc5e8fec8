mod registry;

pub use registry::{AgentRegistration, InMemoryReadinessRegistry};
