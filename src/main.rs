use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use registration_mailer::config::Settings;
use registration_mailer::notification::{NotificationRequest, NotificationService};
use registration_mailer::postgres::{PgRecordStore, PostgresPool};
use registration_mailer::records::{MemoryRecordStore, RecordStore};
use registration_mailer::telemetry::{init_telemetry, LogFormat};
use registration_mailer::template::{create_template_store, ids};
use registration_mailer::transport::create_mail_transport;

/// Reads one JSON `NotificationRequest` per stdin line and writes one JSON
/// result per line to stdout.
#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel, LogFormat::from_env())?;
    tracing::info!("Configuration loaded");

    // Transport configuration is a startup precondition
    let transport = create_mail_transport(&settings.smtp)?;

    let templates = create_template_store(&settings.templates);
    templates
        .warm(&ids::ALL)
        .await
        .context("Failed to load message templates")?;
    tracing::info!(
        dir = %templates.dir().display(),
        count = templates.count(),
        "Templates loaded"
    );

    let pool = match &settings.database {
        Some(database) => Some(PostgresPool::new(database).await?),
        None => None,
    };
    let records: Arc<dyn RecordStore> = match &pool {
        Some(pool) => Arc::new(PgRecordStore::new(pool.pool().clone())),
        None => {
            tracing::warn!("No database configured, verification lookups use an empty memory store");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let service = Arc::new(NotificationService::new(
        &settings, templates, records, transport,
    ));
    tracing::info!("Notification service initialized");

    // Single writer keeps result lines whole
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    let shutdown = shutdown_signal_handler();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    tracing::info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<NotificationRequest>(&line) {
                    Ok(request) => {
                        let service = service.clone();
                        let out_tx = out_tx.clone();
                        tasks.spawn(async move {
                            let response = service.process(&request).await;
                            match serde_json::to_string(&response) {
                                Ok(json) => {
                                    let _ = out_tx.send(json);
                                }
                                Err(e) => tracing::error!(error = %e, "Failed to encode result"),
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Rejected malformed request line");
                        let _ = out_tx.send(
                            serde_json::json!({
                                "outcome": "invalid-request",
                                "error": e.to_string(),
                            })
                            .to_string(),
                        );
                    }
                }
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Notification task panicked");
            }
        }
    }

    // Let in-flight dispatches finish; there is no cancellation mid-dispatch
    tracing::info!(in_flight = tasks.len(), "Waiting for in-flight notifications...");
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Notification task panicked");
        }
    }

    drop(out_tx);
    writer.await??;

    if let Some(pool) = pool {
        pool.close().await;
    }

    let stats = service.dispatcher_stats();
    tracing::info!(
        attempted = stats.total_attempted,
        delivered = stats.total_delivered,
        failed = stats.total_failed,
        swallowed = stats.total_swallowed,
        "Mailer shutdown complete"
    );
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
