// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{error, info};
use zkp_cli::{open_source, server, Cli, Pipeline, SnifferConfig};
use zkp_metrics::{Metrics, PrometheusObserver};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init("zk-packet")?;

    let mut config =
        SnifferConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let metrics = Arc::new(Metrics::new().context("registering metrics")?);
    let stop = Arc::new(AtomicBool::new(false));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let metrics_server = if config.metrics.enabled {
        let address = config.metrics.listen_address;
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("binding metrics listener on {address}"))?;
        info!(%address, "serving metrics");
        Some(tokio::spawn(server::serve(listener, metrics.clone(), async move {
            let _ = shutdown_rx.await;
        })))
    } else {
        None
    };

    let mut source = open_source(&config.capture, stop.clone())?;
    info!(
        service_port = config.capture.service_port,
        "observing ZooKeeper traffic"
    );

    let mut capture = tokio::task::spawn_blocking({
        let stop = stop.clone();
        let observer = PrometheusObserver::new(metrics.clone());
        let service_port = config.capture.service_port;
        move || {
            let mut pipeline = Pipeline::new(service_port, observer);
            pipeline.run(source.as_mut(), &stop)
        }
    });

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let finished = tokio::select! {
        result = &mut capture => result,
        _ = sigint.recv() => {
            info!("received SIGINT, stopping capture");
            stop.store(true, Ordering::Relaxed);
            capture.await
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, stopping capture");
            stop.store(true, Ordering::Relaxed);
            capture.await
        }
    };

    let outcome = finished.context("capture task failed");
    if let Ok(Err(e)) = &outcome {
        error!(error = %e, "capture error");
    }

    if cli.dump_metrics {
        print!("{}", metrics.render());
    }

    let _ = shutdown_tx.send(());
    if let Some(handle) = metrics_server {
        handle.await.context("metrics server task failed")??;
    }

    outcome??;
    Ok(())
}
