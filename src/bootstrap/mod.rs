//! Bootstrap module - Application initialization and wiring
//! 引导模块 - 应用初始化和依赖注入

pub mod config;
pub mod tracing;
pub mod wiring;

pub use self::tracing::init_tracing_subscriber;
pub use config::{load_app_config, AppConfig};
pub use wiring::{wire_setup, ChatSetup, WiringError, WiringResult, WorkbenchPorts};
