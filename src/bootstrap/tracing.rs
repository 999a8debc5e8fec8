//! Tracing configuration for chat setup
//!
//! ## Behavior / 行为
//!
//! - **Development**: debug level for the setup crates
//! - **Production**: info level everywhere
//! - **RUST_LOG**: overrides the built-in directives when set

use tracing_subscriber::{fmt, fmt::time::ChronoUtc, prelude::*, registry};

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let app_level = if is_dev { "debug" } else { "info" };
    vec![
        "info".to_string(),
        format!("chat_setup={app_level}"),
        format!("cs_app={app_level}"),
        format!("cs_infra={app_level}"),
    ]
}

/// Initialize the global tracing subscriber.
///
/// 只能调用一次；重复注册会返回错误。
///
/// ## Errors / 错误
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let filter_directives = build_filter_directives(is_development());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    let stdout_layer = fmt::layer()
        .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(cfg!(not(test)));

    registry().with(env_filter).with(stdout_layer).try_init()?;

    Ok(())
}
