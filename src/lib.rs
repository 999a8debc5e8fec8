//! Chat setup host crate.
//!
//! Wires the setup use cases to the file-backed settings store and the
//! in-memory readiness registry. Workbench-facing ports (identity, installer,
//! dialogs, transcript) are supplied by the embedding host.

pub mod bootstrap;

pub use bootstrap::{
    init_tracing_subscriber, load_app_config, wire_setup, AppConfig, ChatSetup, WorkbenchPorts,
};
