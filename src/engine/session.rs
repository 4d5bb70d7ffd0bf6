// Crisis analysis session
//
// One session per active conversation. It owns the history windows, the
// alert slot and the escalation baseline; nothing is shared across sessions.

use anyhow::{anyhow, Context, Result};
use futures::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::debounce::Debouncer;
use super::events::{CrisisEvent, EventRegistry, SubscriptionId};
use super::monitor::{InputEvent, MonitorHandle};
use super::result::{AnalyzeOptions, CrisisAnalysisResult, SessionSnapshot};
use crate::affect::{AffectLexicon, EmotionEstimator, EmotionalState};
use crate::alert::{CrisisAlert, CrisisSeverity, EscalationTracker};
use crate::config::EngineConfig;
use crate::errors::{lexicon_load_error, ml_endpoint_error, AnalysisError};
use crate::history::{
    emotional_trend, risk_prediction, BoundedHistory, EmotionalTrend, RiskPrediction,
};
use crate::interventions::{InterventionRecommendation, InterventionRecommender};
use crate::metrics::ModelMetrics;
use crate::scoring::{AnalysisContext, HttpMlAnalyzer, MlAnalysis, MlAnalyzer, RiskScorer};

/// Mutable per-session state, guarded by one lock
struct SessionState {
    last_analysis: Option<CrisisAnalysisResult>,
    alert: CrisisAlert,
    emotional_history: BoundedHistory<EmotionalState>,
    risk_trend: BoundedHistory<f64>,
    analysis_history: BoundedHistory<CrisisAnalysisResult>,
    analysis_count: u64,
    escalation: EscalationTracker,
    metrics: ModelMetrics,
}

impl SessionState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            last_analysis: None,
            alert: CrisisAlert::default(),
            emotional_history: BoundedHistory::new(config.emotional_history_limit),
            risk_trend: BoundedHistory::new(config.risk_trend_window),
            analysis_history: BoundedHistory::new(config.max_history_size),
            analysis_count: 0,
            escalation: EscalationTracker::new(config.escalation_delta),
            metrics: ModelMetrics::new(),
        }
    }
}

struct SessionInner {
    config: EngineConfig,
    estimator: EmotionEstimator,
    scorer: RiskScorer,
    recommender: InterventionRecommender,
    analyzer: Option<Arc<dyn MlAnalyzer>>,
    state: Mutex<SessionState>,
    events: EventRegistry,
    debouncer: Debouncer,
    shutdown: CancellationToken,
    active: AtomicBool,
}

/// Builder for `CrisisSession`
pub struct CrisisSessionBuilder {
    config: EngineConfig,
    estimator: EmotionEstimator,
    scorer: RiskScorer,
    analyzer: Option<Arc<dyn MlAnalyzer>>,
}

impl CrisisSessionBuilder {
    /// Attach an ML analyzer; without one every analysis is heuristic
    pub fn analyzer(mut self, analyzer: Arc<dyn MlAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn estimator(mut self, estimator: EmotionEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn build(self) -> CrisisSession {
        let state = SessionState::new(&self.config);
        CrisisSession {
            inner: Arc::new(SessionInner {
                config: self.config,
                estimator: self.estimator,
                scorer: self.scorer,
                recommender: InterventionRecommender::new(),
                analyzer: self.analyzer,
                state: Mutex::new(state),
                events: EventRegistry::new(),
                debouncer: Debouncer::new(),
                shutdown: CancellationToken::new(),
                active: AtomicBool::new(true),
            }),
        }
    }
}

/// Orchestrates estimation, scoring, history, alerting and recommendations
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct CrisisSession {
    inner: Arc<SessionInner>,
}

impl CrisisSession {
    /// Heuristic-only session
    pub fn new(config: EngineConfig) -> Self {
        Self::builder(config).build()
    }

    /// Session wired from configuration alone
    ///
    /// Loads `lexicon_path` when set and attaches an HTTP analyzer when
    /// `ml_endpoint` is set.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder(config.clone());
        if let Some(path) = &config.lexicon_path {
            let lexicon = AffectLexicon::load_from_file(path).map_err(|e| {
                anyhow!(lexicon_load_error(&path.display().to_string(), &format!("{:#}", e)))
            })?;
            builder = builder.estimator(EmotionEstimator::with_lexicon(lexicon));
        }
        if let Some(endpoint) = &config.ml_endpoint {
            let analyzer = HttpMlAnalyzer::new(
                endpoint.clone(),
                Duration::from_millis(config.ml_timeout_ms),
            )
            .with_context(|| ml_endpoint_error(endpoint))?;
            builder = builder.analyzer(Arc::new(analyzer));
        }
        Ok(builder.build())
    }

    pub fn builder(config: EngineConfig) -> CrisisSessionBuilder {
        CrisisSessionBuilder {
            config,
            estimator: EmotionEstimator::new(),
            scorer: RiskScorer::new(),
            analyzer: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Analyze `text` now
    ///
    /// Returns None when the text is rejected, the backend fails without a
    /// permitted fallback, or the session is disposed. None means "no
    /// update": the previous analysis and alert stay in place.
    pub async fn analyze_text(
        &self,
        text: &str,
        context: &AnalysisContext,
        options: AnalyzeOptions,
    ) -> Option<CrisisAnalysisResult> {
        self.inner.analyze_text(text, context, options).await
    }

    /// Analyze `text` after `debounce_ms` of inactivity
    ///
    /// Each call replaces the pending one, so only the last call of a burst
    /// runs. Ignored while the session is stopped or disposed.
    ///
    /// The timer lives on the current Tokio runtime. Called outside one, the
    /// request is logged and dropped.
    pub fn analyze_text_debounced(&self, text: impl Into<String>, context: AnalysisContext) {
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("No Tokio runtime, debounced analysis ignored");
            return;
        }
        SessionInner::schedule_debounced(&self.inner, text.into(), context);
    }

    /// Forward a stream of input events into the debounced analyzer
    ///
    /// The returned handle detaches the stream when dropped. When
    /// `auto_analyze` is off the handle is inert and the stream is not read.
    /// The forwarding task runs on the current Tokio runtime; without one the
    /// handle is inert as well.
    pub fn monitor_text_input<S>(&self, input: S, context: AnalysisContext) -> MonitorHandle
    where
        S: Stream<Item = InputEvent> + Send + Unpin + 'static,
    {
        if !self.inner.config.auto_analyze {
            tracing::debug!("Auto-analysis disabled, input monitor not attached");
            return MonitorHandle::inert();
        }
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("No Tokio runtime, input monitor not attached");
            return MonitorHandle::inert();
        }

        let token = self.inner.shutdown.child_token();
        let task_token = token.clone();
        let weak = Arc::downgrade(&self.inner);
        let mut input = input;

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    next = input.next() => {
                        let Some(event) = next else { break };
                        let Some(inner) = weak.upgrade() else { break };
                        SessionInner::schedule_debounced(&inner, event.into_text(), context.clone());
                    }
                }
            }
            tracing::debug!("Input monitor detached");
        });

        MonitorHandle::new(token, task)
    }

    /// Empty all history windows and reset the counters and escalation baseline
    ///
    /// The current alert is left as it is.
    pub fn clear_history(&self) {
        let mut state = self.inner.lock_state();
        state.last_analysis = None;
        state.emotional_history.clear();
        state.risk_trend.clear();
        state.analysis_history.clear();
        state.analysis_count = 0;
        state.escalation.reset();
        tracing::debug!("Session history cleared");
    }

    /// Hide the current alert without changing its severity
    pub fn dismiss_alert(&self) {
        let mut state = self.inner.lock_state();
        state.alert.dismiss();
        tracing::debug!(severity = %state.alert.severity, "Crisis alert dismissed");
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CrisisEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Called with the analysis whenever risk reaches the crisis floor
    pub fn on_crisis_detected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CrisisAnalysisResult) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let CrisisEvent::CrisisDetected { analysis } = event {
                callback(analysis);
            }
        })
    }

    /// Called with the new risk level when it jumps past the escalation delta
    pub fn on_risk_escalation<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let CrisisEvent::RiskEscalation { current, .. } = event {
                callback(*current);
            }
        })
    }

    /// Called with the recommendations whenever there are any
    pub fn on_intervention_recommended<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[InterventionRecommendation]) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let CrisisEvent::InterventionRecommended {
                recommendations, ..
            } = event
            {
                callback(recommendations);
            }
        })
    }

    /// Accept debounced and monitored input again after `stop`
    pub fn start(&self) {
        if self.is_disposed() {
            tracing::warn!("Cannot start a disposed session");
            return;
        }
        self.inner.active.store(true, Ordering::SeqCst);
    }

    /// Cancel the pending debounced analysis and ignore new debounced input
    pub fn stop(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
        self.inner.debouncer.cancel();
    }

    /// Tear the session down
    ///
    /// Cancels the pending timer and all input monitors, drops listeners,
    /// and discards results of analyses still in flight. Every later
    /// `analyze_text` returns None.
    pub fn dispose(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.active.store(false, Ordering::SeqCst);
        self.inner.shutdown.cancel();
        self.inner.debouncer.cancel();
        self.inner.events.clear();
        tracing::debug!("Session disposed");
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Whether a debounced analysis is waiting to fire
    pub fn has_pending_analysis(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    pub fn last_analysis(&self) -> Option<CrisisAnalysisResult> {
        self.inner.lock_state().last_analysis.clone()
    }

    pub fn crisis_alert(&self) -> CrisisAlert {
        self.inner.lock_state().alert.clone()
    }

    pub fn emotional_history(&self) -> Vec<EmotionalState> {
        self.inner.lock_state().emotional_history.to_vec()
    }

    pub fn risk_trend(&self) -> Vec<f64> {
        self.inner.lock_state().risk_trend.to_vec()
    }

    pub fn analysis_history(&self) -> Vec<CrisisAnalysisResult> {
        self.inner.lock_state().analysis_history.to_vec()
    }

    pub fn analysis_count(&self) -> u64 {
        self.inner.lock_state().analysis_count
    }

    pub fn model_metrics(&self) -> ModelMetrics {
        self.inner.lock_state().metrics.clone()
    }

    /// Direction of valence over the emotional history window
    pub fn emotional_trend(&self) -> EmotionalTrend {
        let history = self.emotional_history();
        emotional_trend(&history)
    }

    /// Next-step risk extrapolated from the risk trend window
    pub fn risk_prediction(&self) -> RiskPrediction {
        let levels = self.risk_trend();
        risk_prediction(&levels, self.inner.config.risk_trend_window)
    }

    /// Consistent copy of all exposed state
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.lock_state();
        SessionSnapshot {
            last_analysis: state.last_analysis.clone(),
            crisis_alert: state.alert.clone(),
            emotional_history: state.emotional_history.to_vec(),
            risk_trend: state.risk_trend.to_vec(),
            analysis_history: state.analysis_history.to_vec(),
            analysis_count: state.analysis_count,
            model_metrics: state.metrics.clone(),
        }
    }
}

impl SessionInner {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn schedule_debounced(inner: &Arc<SessionInner>, text: String, context: AnalysisContext) {
        if inner.shutdown.is_cancelled() || !inner.active.load(Ordering::SeqCst) {
            tracing::debug!("Session inactive, debounced analysis ignored");
            return;
        }

        let weak: Weak<SessionInner> = Arc::downgrade(inner);
        inner.debouncer.schedule(
            Duration::from_millis(inner.config.debounce_ms),
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .analyze_text(&text, &context, AnalyzeOptions::default())
                        .await;
                }
            },
        );
    }

    async fn analyze_text(
        &self,
        text: &str,
        context: &AnalysisContext,
        options: AnalyzeOptions,
    ) -> Option<CrisisAnalysisResult> {
        match self.try_analyze(text, context, options).await {
            Ok(result) => Some(result),
            Err(e) => {
                match &e {
                    AnalysisError::InputRejected { .. } => {
                        tracing::debug!(error = %e, "Analysis skipped");
                    }
                    AnalysisError::Disposed => {
                        tracing::debug!("Analysis result dropped, session disposed");
                    }
                    _ => {
                        tracing::warn!(kind = e.kind(), error = %e, "Analysis returned no result");
                    }
                }
                None
            }
        }
    }

    async fn try_analyze(
        &self,
        text: &str,
        context: &AnalysisContext,
        options: AnalyzeOptions,
    ) -> Result<CrisisAnalysisResult, AnalysisError> {
        if self.shutdown.is_cancelled() {
            return Err(AnalysisError::Disposed);
        }

        let length = text.chars().count();
        if length < self.config.min_analysis_length {
            return Err(AnalysisError::rejected(format!(
                "text length {} is below the minimum of {}",
                length, self.config.min_analysis_length
            )));
        }

        if !self.config.can_score(self.analyzer.is_some()) {
            tracing::warn!("ML analysis unavailable and heuristic fallback not permitted");
            return Err(AnalysisError::rejected("no scoring path available"));
        }
        let analyzer = self
            .analyzer
            .as_ref()
            .filter(|_| self.config.enable_ml_analysis);

        if options.immediate && self.debouncer.cancel() {
            tracing::debug!("Pending debounced analysis superseded by immediate analysis");
        }

        let started = Instant::now();
        let emotional_state = self.estimator.estimate(text);

        let mut fell_back = false;
        let ml_result: Option<MlAnalysis> = match analyzer {
            Some(analyzer) => match self.call_analyzer(analyzer.as_ref(), text, context).await {
                Ok(analysis) => Some(analysis),
                Err(e) if e.is_backend_error() => {
                    self.lock_state().metrics.record_ml_failure();
                    if !self.config.allow_heuristic_fallback {
                        return Err(e);
                    }
                    tracing::warn!(
                        kind = e.kind(),
                        error = %e,
                        "ML analysis failed, falling back to heuristic scoring"
                    );
                    fell_back = true;
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let cultural_context = context
            .cultural_context
            .as_deref()
            .filter(|_| self.config.enable_cultural_context);
        let language_code = context.language_code.as_deref();

        let score = self.scorer.score(
            text,
            &emotional_state,
            ml_result.as_ref(),
            cultural_context,
        );
        let interventions =
            self.recommender
                .recommend(score.risk_level, &emotional_state, language_code);
        let intervention_recommendations = if score.ml_interventions.is_empty() {
            interventions.iter().map(|r| r.description.clone()).collect()
        } else {
            score.ml_interventions.clone()
        };

        let result = CrisisAnalysisResult {
            analysis_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            risk_level: score.risk_level,
            confidence: score.confidence,
            risk_factors: score.risk_factors,
            emotional_state,
            intervention_recommendations,
            interventions,
            cultural_context: cultural_context.map(String::from),
            immediate_action: score.immediate_action,
            escalation_required: score.escalation_required,
            source: score.source,
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        let (escalated_from, severity) = {
            let mut state = self.lock_state();

            // Checked under the lock so dispose cannot race a half-applied update
            if self.shutdown.is_cancelled() {
                return Err(AnalysisError::Disposed);
            }

            state.last_analysis = Some(result.clone());
            if options.track_history {
                if self.config.enable_emotional_tracking {
                    state.emotional_history.push(result.emotional_state);
                }
                state.risk_trend.push(result.risk_level);
                state.analysis_history.push(result.clone());
            }
            state.analysis_count += 1;

            let escalated_from = state.escalation.observe(result.risk_level);
            state.alert = CrisisAlert::for_risk(result.risk_level, language_code, cultural_context);
            state.metrics.record_analysis(
                result.source,
                result.confidence,
                latency_ms,
                self.config.confidence_threshold,
            );
            if fell_back {
                state.metrics.record_fallback();
            }
            (escalated_from, state.alert.severity)
        };

        tracing::info!(
            analysis_id = %result.analysis_id,
            user = %context.user_id.as_deref().map(hash_user).unwrap_or_default(),
            risk_level = result.risk_level,
            confidence = result.confidence,
            severity = %severity,
            source = result.source.as_str(),
            latency_ms,
            "Analysis complete"
        );

        self.emit_events(&result, escalated_from, severity);
        Ok(result)
    }

    async fn call_analyzer(
        &self,
        analyzer: &dyn MlAnalyzer,
        text: &str,
        context: &AnalysisContext,
    ) -> Result<MlAnalysis, AnalysisError> {
        let timeout = Duration::from_millis(self.config.ml_timeout_ms);

        tokio::select! {
            _ = self.shutdown.cancelled() => Err(AnalysisError::Disposed),
            outcome = tokio::time::timeout(timeout, analyzer.analyze(text, context)) => match outcome {
                Ok(Ok(analysis)) => Ok(analysis),
                Ok(Err(source)) => Err(AnalysisError::BackendFailure {
                    backend: analyzer.name().to_string(),
                    source,
                }),
                Err(_) => Err(AnalysisError::BackendTimeout {
                    backend: analyzer.name().to_string(),
                    timeout_ms: self.config.ml_timeout_ms,
                }),
            },
        }
    }

    fn emit_events(
        &self,
        result: &CrisisAnalysisResult,
        escalated_from: Option<f64>,
        severity: CrisisSeverity,
    ) {
        if result.risk_level >= self.config.crisis_alert_floor {
            tracing::warn!(
                analysis_id = %result.analysis_id,
                risk_level = result.risk_level,
                severity = %severity,
                "Crisis detected"
            );
            self.events.emit(&CrisisEvent::CrisisDetected {
                analysis: result.clone(),
            });
        }

        if let Some(previous) = escalated_from {
            tracing::warn!(
                analysis_id = %result.analysis_id,
                previous,
                current = result.risk_level,
                "Risk escalation"
            );
            self.events.emit(&CrisisEvent::RiskEscalation {
                analysis_id: result.analysis_id.clone(),
                previous,
                current: result.risk_level,
            });
        }

        if !result.interventions.is_empty() {
            self.events.emit(&CrisisEvent::InterventionRecommended {
                analysis_id: result.analysis_id.clone(),
                recommendations: result.interventions.clone(),
            });
        }
    }
}

/// Short stable pseudonym for a user id; raw ids and text never reach the logs
fn hash_user(user_id: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(user_id.as_bytes()));
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CrisisSession {
        CrisisSession::new(EngineConfig::default())
    }

    #[tokio::test]
    async fn test_short_text_rejected_without_side_effects() {
        let session = session();
        let result = session
            .analyze_text("hi", &AnalysisContext::default(), AnalyzeOptions::default())
            .await;

        assert!(result.is_none());
        assert_eq!(session.analysis_count(), 0);
        assert!(session.analysis_history().is_empty());
        assert!(session.model_metrics().total_analyses == 0);
    }

    #[tokio::test]
    async fn test_heuristic_analysis_updates_state() {
        let session = session();
        let result = session
            .analyze_text(
                "I feel completely hopeless and see no way out",
                &AnalysisContext::default(),
                AnalyzeOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.risk_level, 70.0);
        assert!(result.immediate_action);
        assert!(!result.escalation_required);
        assert_eq!(session.last_analysis(), Some(result.clone()));
        assert_eq!(session.risk_trend(), vec![70.0]);
        assert_eq!(session.emotional_history().len(), 1);
        assert_eq!(session.crisis_alert().severity, CrisisSeverity::High);
        assert_eq!(session.analysis_count(), 1);
    }

    #[tokio::test]
    async fn test_untracked_analysis_skips_windows() {
        let session = session();
        let result = session
            .analyze_text(
                "I am so sad and tired today",
                &AnalysisContext::default(),
                AnalyzeOptions::untracked(),
            )
            .await;

        assert!(result.is_some());
        assert!(session.last_analysis().is_some());
        assert!(session.risk_trend().is_empty());
        assert!(session.analysis_history().is_empty());
        assert!(session.emotional_history().is_empty());
    }

    #[tokio::test]
    async fn test_emotional_tracking_disabled() {
        let config = EngineConfig {
            enable_emotional_tracking: false,
            ..Default::default()
        };
        let session = CrisisSession::new(config);
        session
            .analyze_text(
                "I am so sad and tired today",
                &AnalysisContext::default(),
                AnalyzeOptions::default(),
            )
            .await
            .unwrap();

        assert!(session.emotional_history().is_empty());
        assert_eq!(session.risk_trend().len(), 1);
    }

    #[tokio::test]
    async fn test_no_scoring_path_rejected() {
        let config = EngineConfig {
            enable_ml_analysis: false,
            allow_heuristic_fallback: false,
            ..Default::default()
        };
        let session = CrisisSession::new(config);
        let result = session
            .analyze_text(
                "I feel completely hopeless",
                &AnalysisContext::default(),
                AnalyzeOptions::default(),
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cultural_context_recorded() {
        let session = session();
        let context = AnalysisContext::new().with_cultural_context("east_asian");
        let result = session
            .analyze_text("I feel so sad and alone", &context, AnalyzeOptions::default())
            .await
            .unwrap();

        // valence -1 => 5.0 => 50, scaled by 1.2
        assert!((result.risk_level - 60.0).abs() < 1e-9);
        assert_eq!(result.cultural_context.as_deref(), Some("east_asian"));
    }

    #[tokio::test]
    async fn test_dispose_rejects_further_analysis() {
        let session = session();
        session.dispose();
        assert!(session.is_disposed());
        assert!(!session.is_active());

        let result = session
            .analyze_text(
                "I feel completely hopeless",
                &AnalysisContext::default(),
                AnalyzeOptions::default(),
            )
            .await;
        assert!(result.is_none());

        session.start();
        assert!(!session.is_active());
    }

    #[test]
    fn test_hash_user_is_stable() {
        assert_eq!(hash_user("user-1"), hash_user("user-1"));
        assert_ne!(hash_user("user-1"), hash_user("user-2"));
        assert_eq!(hash_user("user-1").len(), 12);
    }
}
