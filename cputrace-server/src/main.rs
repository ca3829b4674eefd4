use clap::Parser;
use cputrace_core::CpuTraceConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use cputrace_server::http;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cputrace.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match CpuTraceConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging — RUST_LOG wins, config supplies the fallback level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    // Connect to DB and bootstrap the traces table
    let pool = match cputrace_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    cputrace_core::db::init_schema(&pool).await?;

    if args.health {
        match cputrace_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ SQLite connected: {}", v),
            Err(e) => {
                println!("❌ SQLite connection failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ CPUTrace DB health check passed");
        return Ok(());
    }

    if config.cors.permissive {
        tracing::warn!(
            "permissive CORS enabled — any origin may call this API; disable [cors] permissive where access control matters"
        );
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(pool, config, tx.subscribe()).await?;

    Ok(())
}
