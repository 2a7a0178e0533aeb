use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use argocd_app_updates::controller::{Reconciler, SelectionPolicy};
use argocd_app_updates::gateway::{ArgoClient, Credentials, GatewayConfig};
use argocd_app_updates::scheduler::{parse_schedule, ReconcileScheduler};
use argocd_app_updates::snapshot::SnapshotStore;
use argocd_app_updates::terminal;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Argo CD server URL
    #[arg(long, global = true, env = "ARGOCD_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Username for session login (used together with --password)
    #[arg(long, global = true, env = "ARGOCD_USERNAME")]
    username: Option<String>,

    /// Password for session login
    #[arg(long, global = true, env = "ARGOCD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, env = "ARGOCD_INSECURE")]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "ARGOCD_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// How the latest chart version is picked: registry-order or highest-version
    #[arg(long, global = true, env = "ARGOCD_VERSION_SELECTION", default_value = "registry-order")]
    selection: SelectionPolicy,

    /// Log output format
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single reconciliation pass and print the result
    Check(CheckArgs),
    /// Reconcile on a schedule and serve the REST API and metrics
    Serve(ServeArgs),
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Only show applications of this project
    #[arg(long, env = "ARGOCD_PROJECT", default_value = "")]
    project: String,

    /// Show all Helm applications, not only those with updates
    #[arg(long)]
    all: bool,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Port of the REST API
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Port of the metrics endpoint
    #[arg(long, env = "METRICS_PORT", default_value_t = 9153)]
    metrics_port: u16,

    /// Cron expression for reconciliation passes (5 or 6 fields)
    #[arg(long, env = "CRON", default_value = "0 */15 * * * *")]
    cron: String,
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}

fn build_reconciler(
    args: &GlobalArgs,
    store: Arc<SnapshotStore>,
) -> anyhow::Result<Reconciler<ArgoClient>> {
    let config = GatewayConfig {
        server: args.server.clone(),
        timeout: Duration::from_secs(args.timeout),
        insecure: args.insecure,
    };
    let client = ArgoClient::new(&config).context("Failed to create Argo CD client")?;

    let credentials = match (&args.username, &args.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            })
        }
        _ => None,
    };

    Ok(Reconciler::new(client, args.server.clone(), store)
        .with_credentials(credentials)
        .with_selection_policy(args.selection))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Version => {
            println!("argocd-app-updates v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Check(check_args) => {
            init_tracing(args.global.log_format);
            run_check(&args.global, check_args).await
        }
        Commands::Serve(serve_args) => {
            init_tracing(args.global.log_format);
            run_serve(&args.global, serve_args).await
        }
    }
}

async fn run_check(global: &GlobalArgs, args: CheckArgs) -> anyhow::Result<()> {
    let store = Arc::new(SnapshotStore::new());
    let reconciler = build_reconciler(global, store)?;

    let snapshot = reconciler
        .reconcile()
        .await
        .context("Reconciliation failed")?;

    let apps = if args.all {
        snapshot.with_source_kind(argocd_app_updates::types::SourceKind::Helm, &args.project)
    } else {
        snapshot.with_updates_available(&args.project)
    };
    println!("{}", terminal::render(&apps));
    Ok(())
}

#[cfg(feature = "rest-api")]
async fn run_serve(global: &GlobalArgs, args: ServeArgs) -> anyhow::Result<()> {
    use argocd_app_updates::rest_api::{run_server, ApiState, ServerConfig};

    tracing::info!(
        "Starting argocd-app-updates v{} against {}",
        env!("CARGO_PKG_VERSION"),
        global.server
    );

    let schedule = parse_schedule(&args.cron)?;
    let store = Arc::new(SnapshotStore::new());
    let reconciler = Arc::new(build_reconciler(global, Arc::clone(&store))?);

    // Initial pass so the dashboard is populated before the first tick
    if let Err(e) = reconciler.reconcile().await {
        tracing::error!(error = %e, "Initial reconciliation pass failed");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler = ReconcileScheduler::new(Arc::clone(&reconciler), schedule);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    let config = ServerConfig {
        port: args.port,
        metrics_port: args.metrics_port,
    };
    let state = ApiState { store };

    tokio::select! {
        result = run_server(state, config) => {
            result.context("REST API server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = scheduler_task.await;
    Ok(())
}

#[cfg(not(feature = "rest-api"))]
async fn run_serve(_global: &GlobalArgs, _args: ServeArgs) -> anyhow::Result<()> {
    anyhow::bail!("serve requires the rest-api feature")
}
