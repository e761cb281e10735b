use std::sync::Arc;
use std::time::Duration;

use backend_domain::{
    current_millis, Alert, AlertChange, ApplyOutcome, AssessmentContext, EngineError, EventSource,
    LoginEvent, PipelineState, PipelineStatus, RetractRecord, SourcePoll, SourceRecord,
};
use tokio::sync::{watch, RwLock};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{AlertMaterializer, AlertSnapshotStore, AppState, GuardedAssessor, HistoryStore, Metrics};

/// Sending side of the pipeline's shutdown signal. Dropping it also stops
/// the pipeline.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.0.send(true);
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), rx)
}

/// Resolves once shutdown has been requested or the trigger is gone.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Single worker driving source → history → classifier → assessor →
/// materializer. Runs apart from the HTTP tasks so a slow assessor never
/// blocks readers.
pub struct StreamPipeline {
    history: Arc<HistoryStore>,
    assessor: Arc<GuardedAssessor>,
    materializer: Arc<AlertMaterializer>,
    snapshots: Arc<AlertSnapshotStore>,
    metrics: Arc<Metrics>,
    status: Arc<RwLock<PipelineStatus>>,
    poll_interval: Duration,
}

impl StreamPipeline {
    pub fn new(state: &AppState) -> Self {
        Self {
            history: state.history.clone(),
            assessor: state.assessor.clone(),
            materializer: state.materializer.clone(),
            snapshots: state.snapshots.clone(),
            metrics: state.metrics.clone(),
            status: state.pipeline_status.clone(),
            poll_interval: Duration::from_millis(state.config.poll_interval_ms.max(1)),
        }
    }

    /// Runs until the source is exhausted or shutdown is requested. After a
    /// source fault the pipeline idles in `Faulted` until shutdown. Returns
    /// how the run ended: `Faulted` after a fault, otherwise `Stopped`.
    pub async fn run(
        self,
        mut source: Box<dyn EventSource>,
        mut shutdown: watch::Receiver<bool>,
    ) -> PipelineState {
        let description = source.describe();
        {
            let mut status = self.status.write().await;
            status.source = description.clone();
            status.started_at = Some(current_millis());
        }
        self.transition(PipelineState::Running, None).await;
        info!(source = %description, "stream pipeline running");

        loop {
            if *shutdown.borrow() {
                return self.drain().await;
            }

            let polled = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    return self.drain().await;
                }
                polled = source.poll_next() => polled,
            };

            match polled {
                Ok(SourcePoll::Record(record)) => {
                    if let Err(err) = self.process_record(record, &mut shutdown).await {
                        self.metrics.record_skipped();
                        warn!(error = %err, "event skipped");
                    }
                }
                Ok(SourcePoll::Pending) => {
                    tokio::select! {
                        _ = sleep(self.poll_interval) => {}
                        _ = wait_for_shutdown(&mut shutdown) => {
                            return self.drain().await;
                        }
                    }
                }
                Ok(SourcePoll::Exhausted) => {
                    info!(source = %description, "event source exhausted");
                    self.transition(PipelineState::Stopped, None).await;
                    return PipelineState::Stopped;
                }
                Err(err) if err.is_fatal() => {
                    self.metrics.record_source_fault();
                    error!(source = %description, error = %err, "event source faulted, ingestion halted");
                    self.transition(PipelineState::Faulted, Some(err.to_string()))
                        .await;
                    // Stay Faulted, serving the last snapshot, until shutdown.
                    wait_for_shutdown(&mut shutdown).await;
                    self.transition(PipelineState::Stopped, None).await;
                    info!("stream pipeline stopped after fault");
                    return PipelineState::Faulted;
                }
                Err(err) => {
                    self.metrics.record_skipped();
                    warn!(error = %err, "event skipped");
                }
            }
        }
    }

    pub async fn process_record(
        &self,
        record: SourceRecord,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<ApplyOutcome>, EngineError> {
        match record {
            SourceRecord::Login(event) => self.process_login(event, shutdown).await,
            SourceRecord::Retract(retract) => self.process_retract(retract).await.map(Some),
        }
    }

    /// Returns `None` for events that were not anomalous.
    pub async fn process_login(
        &self,
        event: LoginEvent,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<ApplyOutcome>, EngineError> {
        let event = event.normalized()?;
        let decision = self.history.classify(&event).await;
        self.metrics.record_event();
        if !decision.is_anomaly {
            debug!(user_id = %event.user_id, country = %event.country, "known country");
            return Ok(None);
        }
        self.metrics.record_anomaly();

        let context = AssessmentContext::new(&event, &decision);
        let assessment = self.assessor.assess(&context, shutdown).await;
        if assessment.is_fallback() {
            self.metrics.record_assessment_fallback();
        }

        let alert = Alert::from_judgment(&event, assessment.judgment);
        info!(
            alert_id = %alert.alert_id,
            user_id = %event.user_id,
            country = %event.country,
            risk_score = alert.risk_score,
            "anomalous login"
        );
        let outcome = self.materializer.apply(AlertChange::Upsert(alert)).await;
        if outcome.is_change() {
            self.metrics.record_upsert();
            self.refresh_status().await;
        }
        Ok(Some(outcome))
    }

    async fn process_retract(&self, retract: RetractRecord) -> Result<ApplyOutcome, EngineError> {
        let alert_id = retract.resolve()?;
        let outcome = self
            .materializer
            .apply(AlertChange::Retract(alert_id.clone()))
            .await;
        if outcome.is_change() {
            self.metrics.record_retraction();
            info!(%alert_id, "alert retracted");
            self.refresh_status().await;
        } else {
            debug!(%alert_id, "retract for unknown alert ignored");
        }
        Ok(outcome)
    }

    async fn drain(&self) -> PipelineState {
        self.transition(PipelineState::Draining, None).await;
        info!("shutdown requested, draining stream pipeline");
        self.transition(PipelineState::Stopped, None).await;
        info!("stream pipeline stopped");
        PipelineState::Stopped
    }

    async fn refresh_status(&self) {
        let live_alerts = self.materializer.live_count().await;
        let snapshot_version = self.snapshots.read().await.version;
        let mut status = self.status.write().await;
        status.live_alerts = live_alerts;
        status.snapshot_version = snapshot_version;
        status.updated_at = current_millis();
    }

    async fn transition(&self, next: PipelineState, last_error: Option<String>) {
        let mut status = self.status.write().await;
        debug!(from = status.state.as_str(), to = next.as_str(), "pipeline transition");
        status.state = next;
        if last_error.is_some() {
            status.last_error = last_error;
        }
        status.updated_at = current_millis();
    }
}
