//! Integration test infrastructure.
//!
//! Starts a disposable Redis container and runs the workspace tests against
//! it. Tests that need Redis skip themselves when it is unreachable, so this
//! is the way to exercise them.
//!
//! # Usage
//!
//! ```bash
//! # Start Redis, run the tests, stop Redis
//! cargo xtask integration
//!
//! # Use a Redis server that is already running
//! cargo xtask integration --no-docker --redis-url redis://localhost:6380
//! ```

pub mod containers;
pub mod error;

pub use error::{IntegrationError, Result};

use std::time::Duration;

use containers::{
    detect_runtime, is_running, start_container, stop_container, wait_for_redis, REDIS_SPEC,
};

use crate::prelude::*;

/// Integration test command.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Run the kvsync test suite against a real Redis server.

The command starts a Redis container with Docker or Podman, runs the
tests with REDIS_URL pointing at it, and stops the container afterward.")]
pub struct IntegrationCommand {
    /// Skip container management (assume Redis is already running).
    #[arg(long)]
    pub no_docker: bool,

    /// Keep the container running after tests complete.
    #[arg(long)]
    pub keep_containers: bool,

    /// Timeout in seconds for the container health check.
    #[arg(long, default_value = "30")]
    pub health_timeout: u64,

    /// Redis URL handed to the tests.
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    /// Package to test.
    #[arg(long, short, default_value = "kvsync")]
    pub package: String,
}

/// Main entry point for integration command.
pub async fn run(command: IntegrationCommand, global: crate::Global) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{}", p_b("Integration Tests"));
        aprintln!();
    }

    let mut started = None;
    if command.no_docker {
        if !global.is_silent() {
            aprintln!(
                "{} Skipping Redis container management (--no-docker)",
                p_y("⚠️")
            );
        }
    } else {
        let runtime = detect_runtime().await?;
        if is_running(runtime, REDIS_SPEC.name).await? {
            if !global.is_silent() {
                aprintln!("{} Redis container already running", p_y("⚠️"));
            }
        } else {
            if !global.is_silent() {
                aprintln!("{} Starting Redis container...", p_b("🐳"));
            }
            start_container(runtime, &REDIS_SPEC).await?;
            started = Some(runtime);

            if !global.is_silent() {
                aprintln!(
                    "{} Waiting for Redis health (max {}s)...",
                    p_b("⏳"),
                    command.health_timeout
                );
            }
            wait_for_redis(
                runtime,
                &REDIS_SPEC,
                Duration::from_secs(command.health_timeout),
            )
            .await?;
        }
    }

    let passed = run_tests(&command, &global).await;

    if let Some(runtime) = started {
        if command.keep_containers {
            if !global.is_silent() {
                aprintln!("{} Container left running (--keep-containers)", p_y("⚠️"));
            }
        } else {
            if !global.is_silent() {
                aprintln!("{} Stopping Redis container...", p_b("🐳"));
            }
            stop_container(runtime, REDIS_SPEC.name).await?;
        }
    }

    aprintln!();
    if passed? {
        aprintln!("{} {}", p_g("✅"), p_g("All integration tests passed!"));
        Ok(())
    } else {
        aprintln!("{} {}", p_r("❌"), p_r("Some integration tests failed"));
        Err(IntegrationError::TestFailed(format!(
            "cargo test -p {} failed",
            command.package
        )))
    }
}

/// Runs `cargo test` for the package with `REDIS_URL` set.
async fn run_tests(command: &IntegrationCommand, global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!(
            "{} Running tests for {} against {}",
            p_b("🔧"),
            p_y(&command.package),
            command.redis_url
        );
    }

    let status = tokio::process::Command::new("cargo")
        .args(["test", "-p", &command.package, "--all-features"])
        .env("REDIS_URL", &command.redis_url)
        .status()
        .await?;

    Ok(status.success())
}
