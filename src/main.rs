use clap::{Parser, Subcommand};

use minpair_backend::config::Config;
use minpair_backend::engine::types::Variant;
use minpair_backend::engine::SessionController;
use minpair_backend::logging::init_tracing;
use minpair_backend::services::word_source::OllamaWordSource;
use minpair_backend::simulation::SimulatedExaminee;

#[derive(Parser)]
#[command(name = "minpair-backend", about = "Adaptive minimal-pair screening engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Run one session against a simulated examinee and print the outcome.
    Simulate {
        #[arg(long, default_value = "strict", value_parser = parse_variant)]
        variant: Variant,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    Variant::parse(s).ok_or_else(|| format!("unknown variant {s:?}, expected strict or generalized"))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config);

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Simulate { variant, seed } => simulate(config, variant, seed).await,
    }
}

async fn serve(config: Config) {
    let app = minpair_backend::create_app(&config);

    let addr = config.bind_addr();
    tracing::info!(%addr, word_source = %config.word_source.endpoint, "minpair-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("server stopped");
}

async fn simulate(config: Config, variant: Variant, seed: Option<u64>) {
    let seed = seed.unwrap_or_else(rand::random);
    let controller = SessionController::from_config(
        OllamaWordSource::new(config.word_source.clone()),
        config.engine_config(variant),
        Default::default(),
    );
    let mut examinee = SimulatedExaminee::for_variant(variant, seed);

    tracing::info!(variant = variant.as_str(), seed, "starting simulated session");
    let outcome = controller.run(&mut examinee).await;

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to encode session outcome"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
