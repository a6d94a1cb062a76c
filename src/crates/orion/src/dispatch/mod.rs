//! Dispatch engine
//!
//! [`DispatchEngine::handle_request`] classifies one message, runs the
//! matching provider, chart pipeline or model call, and folds the outcome
//! into a [`ResponseEnvelope`]. Failures never escape as errors; they become
//! reply text tagged with an [`ErrorClass`].

pub mod envelope;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use llm::config::GEMINI_API_BASE;
use llm::remote::GeminiClient;
use llm::{
    GenerateFailure, GenerateRequest, HistoryTurn, ModelClient, RemoteLlmConfig, RetryingModel,
    UnavailableModel,
};
use tooling::async_utils::delay::Delay;
use tracing::{debug, field, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::artifacts::{latest_csv, ArtifactStore};
use crate::chart::{
    ChartArtifact, ChartError, ChartRenderer, ChartSpec, ChartSynthesizer, PlottersRenderer,
};
use crate::config::{LlmConfig, OrionConfig};
use crate::error::{ErrorClass, OrionError, Result};
use crate::intent::keywords::{fill, Replies};
use crate::intent::{Intent, IntentClassifier, IntentKind, LanguagePack};
use crate::providers::{calculate, format_number, Providers, ToolError, WeatherReport};

pub use envelope::{DispatchRequest, ResponseEnvelope};

/// Build the model client named by `config`
///
/// A missing API key does not fail start-up: the engine still answers every
/// non-model intent and reports the missing key on fallback.
pub fn model_from_config(config: &LlmConfig) -> Result<Arc<dyn ModelClient>> {
    let provider = config.provider.trim().to_lowercase();
    if provider != "gemini" {
        return Err(OrionError::Config(format!(
            "unsupported LLM provider '{}' (only 'gemini' is available)",
            config.provider
        )));
    }

    let Some(api_key) = config.api_key() else {
        warn!(model = %config.model, "GEMINI_API_KEY is not set; model replies are disabled");
        return Ok(Arc::new(UnavailableModel::new(
            config.model.clone(),
            "GEMINI_API_KEY is not set",
        )));
    };

    let base_url = config.api_base.as_deref().unwrap_or(GEMINI_API_BASE);
    let remote = RemoteLlmConfig::new(api_key, base_url, config.model.clone())
        .with_timeout(config.timeout());
    Ok(Arc::new(GeminiClient::new(remote)?))
}

fn language_pack_from_config(config: &OrionConfig) -> Result<LanguagePack> {
    match &config.language.file {
        Some(path) => LanguagePack::from_file(path),
        None => LanguagePack::builtin(&config.language.pack),
    }
}

/// Builder for [`DispatchEngine`]; every collaborator defaults from config
pub struct DispatchEngineBuilder<'a> {
    config: &'a OrionConfig,
    model: Option<Arc<dyn ModelClient>>,
    delay: Option<Arc<dyn Delay>>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    pack: Option<LanguagePack>,
}

impl<'a> DispatchEngineBuilder<'a> {
    pub fn new(config: &'a OrionConfig) -> Self {
        Self {
            config,
            model: None,
            delay: None,
            renderer: None,
            pack: None,
        }
    }

    /// Use `model` instead of the configured Gemini client
    pub fn model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.model = Some(model);
        self
    }

    /// Scheduler for the quota backoff
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn language_pack(mut self, pack: LanguagePack) -> Self {
        self.pack = Some(pack);
        self
    }

    pub fn build(self) -> Result<DispatchEngine> {
        let config = self.config;

        let pack = match self.pack {
            Some(pack) => pack,
            None => language_pack_from_config(config)?,
        };

        let inner = match self.model {
            Some(model) => model,
            None => model_from_config(&config.llm)?,
        };
        let mut model = RetryingModel::new(inner).with_backoff(config.retry.backoff());
        if let Some(delay) = self.delay {
            model = model.with_delay(delay);
        }

        let renderer = self.renderer.unwrap_or_else(|| {
            Arc::new(PlottersRenderer::new(
                config.chart.width,
                config.chart.height,
                config.chart.font_path.clone(),
            )) as Arc<dyn ChartRenderer>
        });

        info!(
            language = %pack.name,
            model = model.model_name(),
            data_dir = %config.chart.data_dir.display(),
            "Dispatch engine ready"
        );

        Ok(DispatchEngine {
            classifier: IntentClassifier::new(pack),
            providers: Providers::new(&config.providers)?,
            model,
            charts: ChartSynthesizer::new(renderer),
            artifacts: ArtifactStore::new(config.chart.output_dir.clone()),
            data_dir: config.chart.data_dir.clone(),
            attach_last_chart: config.artifacts.attach_last_chart,
        })
    }
}

/// Routes messages to providers, the chart pipeline or the model
///
/// Shared by reference across concurrent requests; the artifact store is the
/// only mutable state.
pub struct DispatchEngine {
    classifier: IntentClassifier,
    providers: Providers,
    model: RetryingModel,
    charts: ChartSynthesizer,
    artifacts: ArtifactStore,
    data_dir: PathBuf,
    attach_last_chart: bool,
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("language", &self.pack().name)
            .field("model", &self.model.model_name())
            .field("data_dir", &self.data_dir)
            .field("attach_last_chart", &self.attach_last_chart)
            .finish_non_exhaustive()
    }
}

impl DispatchEngine {
    pub fn builder(config: &OrionConfig) -> DispatchEngineBuilder<'_> {
        DispatchEngineBuilder::new(config)
    }

    pub fn from_config(config: &OrionConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn pack(&self) -> &LanguagePack {
        self.classifier.pack()
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn replies(&self) -> &Replies {
        &self.pack().replies
    }

    /// Dispatch one message in the default session without history
    pub async fn handle(&self, message: &str) -> ResponseEnvelope {
        self.handle_request(DispatchRequest::new(message)).await
    }

    pub async fn handle_request(&self, request: DispatchRequest) -> ResponseEnvelope {
        let request_id = Uuid::new_v4();
        let session = request.session_id();
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            session = %session,
            intent = field::Empty
        );

        async move {
            if request.message.trim().is_empty() {
                debug!("Blank message");
                return ResponseEnvelope::text(&self.replies().empty_message);
            }

            let intent = self.classifier.classify(&request.message);
            let kind = intent.kind();
            Span::current().record("intent", kind.as_str());

            let envelope = match intent {
                Intent::Greeting => ResponseEnvelope::text(&self.replies().greeting),
                Intent::VoiceHint => ResponseEnvelope::text(&self.replies().voice_hint),
                Intent::ScrapeHint => ResponseEnvelope::text(&self.replies().scrape_hint),
                Intent::TranslateHint => ResponseEnvelope::text(&self.replies().translate_hint),
                Intent::CalculateHint => ResponseEnvelope::text(&self.replies().calculate_hint),
                Intent::Weather => self.weather().await,
                Intent::ChartRequest { spec } => {
                    self.chart_latest(session, request_id, spec).await
                }
                Intent::ChartFromNamedCsv { file, spec } => {
                    self.chart_named(session, request_id, file.as_deref(), spec)
                        .await
                }
                Intent::Fallback => {
                    self.fallback(session, &request.message, request.history)
                        .await
                }
            };

            let envelope = envelope.with_intent(kind);
            if let Some(class) = envelope.class {
                info!(class = %class, "Request answered with failure text");
            }
            envelope
        }
        .instrument(span)
        .await
    }

    /// Current conditions for the configured city
    pub async fn weather(&self) -> ResponseEnvelope {
        let envelope = match self.providers.weather.current().await {
            Ok(report) => ResponseEnvelope::text(self.weather_text(&report)),
            Err(e) => {
                warn!(error = %e, "Weather lookup failed");
                self.tool_failure(&self.replies().weather_error, &e)
            }
        };
        envelope.with_intent(IntentKind::Weather)
    }

    fn weather_text(&self, report: &WeatherReport) -> String {
        let replies = self.replies();
        let temperature = report
            .temperature
            .map(format_number)
            .unwrap_or_else(|| replies.unknown_temperature.clone());
        let wind = report
            .wind_speed
            .map(format_number)
            .unwrap_or_else(|| replies.unknown_wind.clone());

        fill(
            &replies.weather_report,
            &[
                ("city", report.city.as_str()),
                ("temperature", temperature.as_str()),
                ("wind", wind.as_str()),
            ],
        )
    }

    pub async fn search(&self, query: &str) -> ResponseEnvelope {
        if query.trim().is_empty() {
            return ResponseEnvelope::text(&self.replies().search_empty);
        }

        match self.providers.search.search(query).await {
            Ok(Some(text)) => ResponseEnvelope::text(text),
            Ok(None) => ResponseEnvelope::text(&self.replies().search_empty),
            Err(e) => {
                warn!(error = %e, "Search failed");
                self.tool_failure(&self.replies().search_error, &e)
            }
        }
    }

    /// Translate `text`; `None` or a blank target uses the configured default
    pub async fn translate(&self, text: &str, target: Option<&str>) -> ResponseEnvelope {
        let target = target.unwrap_or_default();
        match self.providers.translate.translate(text, target).await {
            Ok(translated) => ResponseEnvelope::text(translated),
            Err(e) => {
                warn!(error = %e, "Translation failed");
                self.tool_failure(&self.replies().translate_error, &e)
            }
        }
    }

    pub fn calculate(&self, expression: &str) -> ResponseEnvelope {
        let replies = self.replies();
        match calculate(expression) {
            Ok(value) => ResponseEnvelope::text(fill(
                &replies.calc_result,
                &[("value", format_number(value).as_str())],
            )),
            Err(e @ ToolError::InputRejected(_)) => {
                debug!(error = %e, "Expression rejected");
                ResponseEnvelope::text(&replies.calc_rejected).with_class(e.class())
            }
            Err(e) => self.tool_failure(&replies.calc_error, &e),
        }
    }

    fn tool_failure(&self, template: &str, error: &ToolError) -> ResponseEnvelope {
        ResponseEnvelope::text(fill(template, &[("error", error.to_string().as_str())]))
            .with_class(error.class())
    }

    /// Chart an explicit CSV file in the default session
    pub async fn chart_from_file(&self, csv: &Path, spec: ChartSpec) -> ResponseEnvelope {
        if !csv.is_file() {
            return ResponseEnvelope::text(&self.replies().csv_not_found)
                .with_class(ErrorClass::DataError);
        }

        let request_id = Uuid::new_v4();
        match self
            .render_chart(Uuid::nil(), request_id, csv.to_path_buf(), spec)
            .await
        {
            Ok(artifact) => self.chart_created(artifact),
            Err(e) => self.chart_failure(e),
        }
    }

    async fn chart_latest(
        &self,
        session: Uuid,
        request_id: Uuid,
        spec: ChartSpec,
    ) -> ResponseEnvelope {
        let Some(csv) = latest_csv(&self.data_dir) else {
            info!(data_dir = %self.data_dir.display(), "No CSV to chart");
            return ResponseEnvelope::text(&self.replies().no_csv)
                .with_class(ErrorClass::DataError);
        };

        let kind = spec.kind;
        let file = display_name(&csv);
        match self.render_chart(session, request_id, csv, spec).await {
            Ok(artifact) => ResponseEnvelope::text(fill(
                &self.replies().chart_success,
                &[("kind", kind.as_str()), ("file", file.as_str())],
            ))
            .with_artifact(Some(artifact.path)),
            Err(e) => self.chart_failure(e),
        }
    }

    async fn chart_named(
        &self,
        session: Uuid,
        request_id: Uuid,
        file: Option<&str>,
        spec: ChartSpec,
    ) -> ResponseEnvelope {
        let csv = file.map(|name| self.data_dir.join(name)).filter(|p| p.is_file());
        let Some(csv) = csv else {
            info!(file = ?file, "Named CSV not found");
            return ResponseEnvelope::text(&self.replies().csv_not_found)
                .with_class(ErrorClass::DataError);
        };

        match self.render_chart(session, request_id, csv, spec).await {
            Ok(artifact) => self.chart_created(artifact),
            Err(e) => self.chart_failure(e),
        }
    }

    async fn render_chart(
        &self,
        session: Uuid,
        request_id: Uuid,
        csv: PathBuf,
        mut spec: ChartSpec,
    ) -> std::result::Result<ChartArtifact, ChartError> {
        let ticket = self.artifacts.begin();
        if spec.title.is_none() {
            spec.title = Some(fill(
                &self.replies().chart_title,
                &[("kind", spec.kind.as_str()), ("file", display_name(&csv).as_str())],
            ));
        }

        let output = self.artifacts.allocate(spec.kind, request_id);
        let artifact = self.charts.render_file(csv, spec, output).await?;
        self.artifacts.record(session, ticket, artifact.path.clone());
        Ok(artifact)
    }

    fn chart_created(&self, artifact: ChartArtifact) -> ResponseEnvelope {
        let file = display_name(&artifact.path);
        ResponseEnvelope::text(fill(&self.replies().chart_created, &[("file", file.as_str())]))
            .with_artifact(Some(artifact.path))
    }

    fn chart_failure(&self, error: ChartError) -> ResponseEnvelope {
        warn!(error = %error, "Chart synthesis failed");
        ResponseEnvelope::text(fill(
            &self.replies().chart_error,
            &[("error", error.to_string().as_str())],
        ))
        .with_class(error.class())
    }

    async fn fallback(
        &self,
        session: Uuid,
        message: &str,
        history: Vec<HistoryTurn>,
    ) -> ResponseEnvelope {
        let request = GenerateRequest::new(message).with_history(history);
        let replies = self.replies();

        let envelope = match self.model.generate(&request).await {
            Ok(text) => ResponseEnvelope::text(text),
            Err(failure) => {
                let (template, class) = match &failure {
                    GenerateFailure::Rejected(_) => {
                        (&replies.model_error, ErrorClass::UpstreamUnavailable)
                    }
                    GenerateFailure::RetryExhausted(e) if e.is_rate_limited() => {
                        (&replies.model_retry_exhausted, ErrorClass::RateLimited)
                    }
                    GenerateFailure::RetryExhausted(_) => {
                        (&replies.model_retry_exhausted, ErrorClass::UpstreamUnavailable)
                    }
                };
                ResponseEnvelope::text(fill(
                    template,
                    &[("error", failure.error().to_string().as_str())],
                ))
                .with_class(class)
            }
        };

        let lingering = if self.attach_last_chart {
            self.artifacts.latest_for(session)
        } else {
            None
        };
        envelope.with_artifact(lingering)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
