use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use backend_application::{shutdown_channel, wait_for_shutdown, AppState, StreamPipeline};
use backend_domain::{EventSource, PipelineState};
use backend_interfaces_http::build_router;

use crate::context::AppContext;

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, error = %err, "ignoring invalid cors origin");
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(cors_layer(&state.config.cors_origins))
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds.max(1),
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone() -> Result<()> {
    let context = AppContext::new().await?;
    let addr: std::net::SocketAddr = context.state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    let final_state = serve_until(context.state, context.source, listener, shutdown_signal()).await?;
    info!(state = final_state.as_str(), "backend stopped");
    Ok(())
}

/// Runs the stream pipeline and the read API until `signal` resolves, then
/// stops the server, drains the pipeline and returns its terminal state.
///
/// A pipeline that stops or faults on its own leaves the API serving the
/// last published snapshot.
pub async fn serve_until(
    state: AppState,
    source: Box<dyn EventSource>,
    listener: TcpListener,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<PipelineState> {
    let (trigger, shutdown) = shutdown_channel();
    let pipeline = tokio::spawn(StreamPipeline::new(&state).run(source, shutdown.clone()));
    let signal_task = tokio::spawn(async move {
        signal.await;
        info!("shutdown signal received");
        trigger.trigger();
    });

    let app = build_router_with_layers(state);
    let mut server_shutdown = shutdown;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown(&mut server_shutdown).await;
        })
        .await;

    // Dropping the trigger also stops the pipeline if the server exited first.
    signal_task.abort();
    let final_state = match pipeline.await {
        Ok(final_state) => final_state,
        Err(err) => {
            error!(error = %err, "stream pipeline task failed");
            PipelineState::Faulted
        }
    };
    served?;
    Ok(final_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;
    use tokio::sync::oneshot;

    use backend_domain::{LoginEvent, RuntimeConfig, SourceRecord};
    use backend_infrastructure::{ChannelSource, StaticRiskAssessor};

    use super::*;

    fn login(user: &str, ts: &str, country: &str) -> SourceRecord {
        SourceRecord::Login(LoginEvent {
            timestamp: ts.parse().expect("timestamp"),
            user_id: user.to_string(),
            ip_address: "192.0.2.10".to_string(),
            location: String::new(),
            city: "Paris".to_string(),
            country: country.to_string(),
            lat: 48.85,
            lon: 2.35,
        })
    }

    async fn fetch_alerts(base: &str) -> Vec<Value> {
        let body: Value = reqwest::get(format!("{}/api/alerts", base))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        body.as_array().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn serves_alerts_while_streaming_and_drains_on_signal() {
        let config = RuntimeConfig {
            poll_interval_ms: 5,
            ..RuntimeConfig::default()
        };
        let state = AppState::new(config, Arc::new(StaticRiskAssessor::new()));
        let (feed, source) = ChannelSource::new(8);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(
            state.clone(),
            Box::new(source),
            listener,
            async move {
                let _ = stop_rx.await;
            },
        ));

        feed.send(login("u1", "2024-01-01T00:00:00Z", "fr"))
            .await
            .expect("send");
        feed.send(login("u1", "2024-01-02T00:00:00Z", "FR"))
            .await
            .expect("send");

        for _ in 0..200 {
            if state.metrics.snapshot().events == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let alerts = fetch_alerts(&base).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["id"], "u1@2024-01-01T00:00:00Z");
        assert_eq!(alerts[0]["location"], "Paris, FR");

        let _ = stop_tx.send(());
        let final_state = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("stops")
            .expect("join")
            .expect("serve");
        assert_eq!(final_state, PipelineState::Stopped);
        drop(feed);
    }
}
