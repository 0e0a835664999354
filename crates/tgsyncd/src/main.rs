// # tgsyncd - Target Group Sync Runner
//
// A thin one-shot integration layer around tgsync-core. All reconciliation
// logic lives in the core crate; this binary only:
//
// 1. Reads configuration from environment variables
// 2. Initializes tracing and the runtime
// 3. Registers the built-in resolvers and control planes
// 4. Runs a single invocation and prints its response
//
// A scheduler (cron, EventBridge, a Kubernetes CronJob, ...) is expected to
// call it periodically. Nothing is kept between runs.
//
// ## Configuration
//
// ### Targets
// - `TARGET_GROUPS` / `TARGET_GROUP_ARN`: JSON array / single target group ARN
// - `RDS_PROXY_ENDPOINTS` / `RDS_PROXY_ENDPOINT`: JSON array / single hostname
// - `TARGET_PORT`: Port for new registrations (default 5432)
//
// ### Reconciliation
// - `RECONCILE_MODE`: fail_fast (default) or best_effort
// - `RECONCILE_PAIRING`: cross_product (default) or one_to_one
//
// ### Resolver
// - `RESOLVER_TYPE`: system (default) or dns
// - `RESOLVER_NAMESERVERS`: Comma-separated nameserver IPs (for dns)
// - `RESOLVER_IP_FAMILY`: v4 (default), v6 or both
//
// ### Control Plane
// - `CONTROL_PLANE_TYPE`: elbv2 (default)
// - `AWS_REGION`: Region override
// - `TGSYNC_MODE`: dry-run to skip register/deregister calls
//
// ### Logging
// - `TGSYNC_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export TARGET_GROUP_ARN=arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/db/0123456789abcdef
// export RDS_PROXY_ENDPOINT=my-proxy.proxy-abc123.us-east-1.rds.amazonaws.com
// export TGSYNC_MODE=dry-run
//
// tgsyncd '{"source": "manual"}'
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tgsync_core::handler::{self, InvocationResponse};
use tgsync_core::{BackendRegistry, Reconciler, ReconcilerConfig};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const ENV_LOG_LEVEL: &str = "TGSYNC_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Every reconciliation succeeded (statusCode 200)
/// - 1: Configuration or startup error
/// - 2: At least one reconciliation failed (statusCode 500)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TgsyncExitCode {
    /// All target groups converged
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Invocation completed with failures
    ReconcileFailed = 2,
}

impl From<TgsyncExitCode> for ExitCode {
    fn from(code: TgsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl TgsyncExitCode {
    fn from_response(response: &InvocationResponse) -> Self {
        if response.is_success() {
            TgsyncExitCode::Success
        } else {
            TgsyncExitCode::ReconcileFailed
        }
    }
}

/// Parse a log level name
fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "{} '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            ENV_LOG_LEVEL,
            raw
        ),
    }
}

/// Parse the optional trigger event passed as the first argument
fn parse_event(arg: Option<String>) -> Result<serde_json::Value> {
    match arg {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).context("Trigger event is not valid JSON")
        }
        _ => Ok(serde_json::Value::Null),
    }
}

fn main() -> ExitCode {
    let log_level = match parse_log_level(
        &env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string()),
    ) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return TgsyncExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr; stdout carries the response only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return TgsyncExitCode::ConfigError.into();
    }

    let config = match ReconcilerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return TgsyncExitCode::ConfigError.into();
        }
    };

    let event = match parse_event(env::args().nth(1)) {
        Ok(event) => event,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return TgsyncExitCode::ConfigError.into();
        }
    };

    info!(
        "Configuration loaded: {} target group(s), {} endpoint(s)",
        config.target_groups.len(),
        config.endpoints.len()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return TgsyncExitCode::ConfigError.into();
        }
    };

    rt.block_on(async {
        let reconciler = match build_reconciler(config).await {
            Ok(reconciler) => reconciler,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return TgsyncExitCode::ConfigError;
            }
        };

        let response = handler::handle(&event, &reconciler).await;

        match serde_json::to_string(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode response: {}", e),
        }

        TgsyncExitCode::from_response(&response)
    })
    .into()
}

/// Register backends and wire a reconciler from configuration
async fn build_reconciler(config: ReconcilerConfig) -> Result<Reconciler> {
    let registry = BackendRegistry::new();

    info!("Registering DNS resolvers");
    tgsync_resolver_dns::register(&registry);

    #[cfg(feature = "elbv2")]
    {
        info!("Registering ELBv2 control plane");
        tgsync_elbv2::register(&registry);
    }

    let resolver = registry
        .create_resolver(&config.resolver)
        .context("Failed to create name resolver")?;
    let control_plane = registry
        .create_control_plane(&config.control_plane)
        .await
        .context("Failed to create control plane")?;

    info!(
        "Using resolver '{}' and control plane '{}'",
        resolver.name(),
        control_plane.name()
    );

    Ok(Reconciler::new(resolver, control_plane, config)?)
}
