//! Connection handling
//!
//! Serves a [`Handler`] over hyper so that an [`Aborted`] request closes the
//! connection instead of producing a response, which `axum::serve` cannot do.

use std::{error::Error as StdError, future::Future, net::SocketAddr, time::Duration};

use axum::body::Body;
use fault_core::{Aborted, Handler};
use hyper::{body::Incoming, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};

/// Accept connections until `shutdown` resolves, then wait up to
/// `drain_timeout` for open connections to finish.
pub async fn serve<F>(
    listener: TcpListener,
    app: Handler,
    shutdown: F,
    drain_timeout: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let builder = Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    },
                };

                let app = app.clone();
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    app.handle(req.map(Body::new))
                });

                let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        log_connection_error(peer, &*err);
                    }
                });
            },
            () = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                break;
            },
        }
    }

    drop(listener);

    tokio::select! {
        () = graceful.shutdown() => {
            info!("All connections closed");
        },
        () = tokio::time::sleep(drain_timeout) => {
            warn!(timeout = ?drain_timeout, "Timed out waiting for connections to close");
        },
    }

    Ok(())
}

fn log_connection_error(peer: SocketAddr, err: &(dyn StdError + 'static)) {
    if Aborted::is_abort(err) {
        debug!(%peer, "Connection dropped by injected fault");
    } else {
        warn!(%peer, error = %err, "Connection error");
    }
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
