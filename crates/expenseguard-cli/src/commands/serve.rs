//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use expenseguard_core::PipelineConfig;

use super::open_pipeline;

pub async fn cmd_serve(
    config: PipelineConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting ExpenseGuard API server...");
    println!("   Models: {}", config.model_dir.display());
    println!("   Match mode: {}", config.match_mode);
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let pipeline = open_pipeline(&config)?;
    if !pipeline.models().fraud_ready() {
        println!("   ⚠️  Fraud model not found - /upload_csv will fail until models are installed");
    }

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .context("static_dir path must be valid UTF-8")
        })
        .transpose()?;

    let server_config = expenseguard_server::ServerConfig { allowed_origins };
    expenseguard_server::serve_with_config(
        pipeline,
        config.server.clone(),
        host,
        port,
        static_dir_str,
        server_config,
    )
    .await?;

    Ok(())
}
