use anyhow::Context;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::io::Write as _;
use std::sync::Arc;
use symsearch::{
    SearchService,
    cli::{Cli, Commands},
    format,
    server::SymbolServer,
    snapshot::Snapshot,
    spawn_reload_worker,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    symsearch::tracing::init(cli.verbose);

    let config = cli.resolve_config()?;
    let service = Arc::new(SearchService::new(config));

    let output = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => return serve(service).await,
        Commands::Query {
            fragment, limit, ..
        } => {
            service.load().await?;
            let outcome = service.search(&fragment).await?;
            format::render_results(&fragment, &outcome.records, limit, &outcome.suggestions)
        }
        Commands::Lookup { token } => {
            service.load().await?;
            format::render_entry(&token, &service.lookup(&token).await?)
        }
        Commands::Compile { out } => {
            let report = service.load().await?;
            let store = service.store().await?;
            Snapshot::new(report.source_digest, store.to_table())
                .write(&out)
                .with_context(|| format!("Failed to write snapshot {}", out.display()))?;
            format!(
                "Wrote {} tokens ({} records) to {}\n",
                report.tokens,
                report.records,
                out.display()
            )
        }
        Commands::Stats => {
            let report = service.load().await?;
            let mut output = format::render_load_report(&report);
            output.push_str(&format::render_stats(&service.stats().await?));
            output
        }
    };

    std::io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")
}

async fn serve(service: Arc<SearchService>) -> anyhow::Result<()> {
    tracing::info!("Starting symsearch MCP server");

    // A failed initial load leaves the tools answering "not loaded" until a reload succeeds
    match service.load().await {
        Ok(report) => tracing::info!("{}", format::render_load_report(&report).trim_end()),
        Err(e) => tracing::error!("Initial symbol index load failed: {:#}", e),
    }

    let cancel = CancellationToken::new();
    let worker = service
        .config()
        .reload_interval()
        .map(|period| spawn_reload_worker(Arc::clone(&service), period, cancel.clone()));

    let server = SymbolServer::new(service);
    let running = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;
    running.waiting().await?;

    cancel.cancel();
    if let Some(worker) = worker {
        let _ = worker.await;
    }
    Ok(())
}
