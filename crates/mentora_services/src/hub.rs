//! The facade bundling one configured service per backend.

use crate::config::ServicesConfig;
use crate::prediction::PredictionAdapter;
use crate::quiz::{HintAdapter, QuizAdapter};
use crate::service::RemoteService;
use crate::transport::{Dispatch, HttpTransport};
use crate::tutor::TutorAdapter;
use mentora_core::{
    HealthReport, Hint, HintRequest, Prediction, Quiz, QuizRequest, ServiceResponse,
    StudentMetrics, TutorReply, TutorRequest,
};
use mentora_error::MentoraResult;
use mentora_rate_limit::RateLimiter;
use std::sync::Arc;

/// Health reports for every upstream backend, gathered in one sweep.
#[derive(Debug, Clone)]
pub struct BackendHealth {
    /// Prediction backend report
    pub prediction: HealthReport,
    /// Quiz-generation backend report (shared by quiz and hint calls)
    pub quiz: HealthReport,
    /// Tutoring backend report
    pub tutor: HealthReport,
}

/// One client per upstream backend, wired from [`ServicesConfig`].
///
/// Web routes hold a single hub for the process lifetime and call the
/// uniform methods below; none of them can fail, and none of them expose
/// transport details.
///
/// # Example
///
/// ```no_run
/// use mentora_core::TutorRequest;
/// use mentora_services::ServiceHub;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let hub = ServiceHub::new()?;
/// let request = TutorRequest::builder().question("What is osmosis?").build()?;
/// let reply = hub.ask_tutor(&request).await;
/// if reply.degraded {
///     println!("reduced mode: {:?}", reply.reason);
/// }
/// println!("{}", reply.value.answer);
/// # Ok(())
/// # }
/// ```
pub struct ServiceHub {
    prediction: RemoteService<PredictionAdapter>,
    quiz: RemoteService<QuizAdapter>,
    hints: RemoteService<HintAdapter>,
    tutor: RemoteService<TutorAdapter>,
}

impl ServiceHub {
    /// Build a hub from the layered default configuration.
    pub fn new() -> MentoraResult<Self> {
        Self::from_config(&ServicesConfig::load()?)
    }

    /// Build a hub from an explicit configuration.
    pub fn from_config(config: &ServicesConfig) -> MentoraResult<Self> {
        let prediction = {
            let cfg = &config.prediction;
            let transport: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.request_timeout())?);
            let probe: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.health_timeout())?);
            RemoteService::from_config(PredictionAdapter, transport, probe, cfg)
        };

        // Quiz and hint calls target the same deployment, so they share
        // one transport, one rate limiter, and one metrics collector.
        let (quiz, hints) = {
            let cfg = &config.quiz;
            let transport: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.request_timeout())?);
            let probe: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.health_timeout())?);
            let limiter = Arc::new(RateLimiter::new(cfg.min_interval()));
            let metrics = Arc::new(crate::metrics::MetricsCollector::new());

            let quiz = RemoteService::new(
                QuizAdapter,
                Arc::clone(&transport),
                Arc::clone(&probe),
                cfg,
                Arc::clone(&limiter),
                Arc::clone(&metrics),
            );
            let hints = RemoteService::new(HintAdapter, transport, probe, cfg, limiter, metrics);
            (quiz, hints)
        };

        let tutor = {
            let cfg = &config.tutor;
            let transport: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.request_timeout())?);
            let probe: Arc<dyn Dispatch> =
                Arc::new(HttpTransport::new(&cfg.base_url, cfg.health_timeout())?);
            RemoteService::from_config(TutorAdapter, transport, probe, cfg)
        };

        Ok(Self {
            prediction,
            quiz,
            hints,
            tutor,
        })
    }

    /// Score one quiz attempt's metrics.
    pub async fn predict(&self, metrics: &StudentMetrics) -> ServiceResponse<Prediction> {
        self.prediction.call(metrics).await
    }

    /// Generate a quiz.
    pub async fn generate_quiz(&self, request: &QuizRequest) -> ServiceResponse<Quiz> {
        self.quiz.call(request).await
    }

    /// Generate a hint for one question.
    pub async fn generate_hint(&self, request: &HintRequest) -> ServiceResponse<Hint> {
        self.hints.call(request).await
    }

    /// Ask the tutor a question.
    pub async fn ask_tutor(&self, request: &TutorRequest) -> ServiceResponse<TutorReply> {
        self.tutor.call(request).await
    }

    /// Probe all three backends.
    pub async fn check_health(&self) -> BackendHealth {
        BackendHealth {
            prediction: self.prediction.check_health().await,
            quiz: self.quiz.check_health().await,
            tutor: self.tutor.check_health().await,
        }
    }

    /// Drop every cached reply across all backends.
    pub fn clear_caches(&self) {
        self.prediction.clear_cache();
        self.quiz.clear_cache();
        self.hints.clear_cache();
        self.tutor.clear_cache();
    }

    /// The prediction service, for per-backend maintenance.
    pub fn prediction(&self) -> &RemoteService<PredictionAdapter> {
        &self.prediction
    }

    /// The quiz-generation service, for per-backend maintenance.
    pub fn quiz(&self) -> &RemoteService<QuizAdapter> {
        &self.quiz
    }

    /// The hint service, for per-backend maintenance.
    pub fn hints(&self) -> &RemoteService<HintAdapter> {
        &self.hints
    }

    /// The tutoring service, for per-backend maintenance.
    pub fn tutor(&self) -> &RemoteService<TutorAdapter> {
        &self.tutor
    }
}
