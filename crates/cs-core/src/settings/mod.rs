//! Persisted user settings consumed by the setup flow.

pub mod defaults;
pub mod model;
