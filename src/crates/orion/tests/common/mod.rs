//! Common test utilities and setup

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use llm::{GenerateRequest, LlmError, ModelClient};
use orion::chart::{ChartPlan, ChartRenderer};
use orion::{ChartError, DispatchEngine, OrionConfig};
use tempfile::TempDir;
use tooling::async_utils::delay::RecordingDelay;

/// Nothing listens here, so every lookup fails fast
pub const UNREACHABLE: &str = "http://127.0.0.1:1/";

/// Config rooted in `dir` with no API key and unreachable providers
pub fn offline_config(dir: &Path) -> OrionConfig {
    let mut config = OrionConfig::default();
    config.llm.api_key = None;
    config.providers.timeout_secs = 1;
    config.providers.weather.base_url = UNREACHABLE.to_string();
    config.providers.search.base_url = UNREACHABLE.to_string();
    config.providers.translate.base_url = UNREACHABLE.to_string();
    config.chart.data_dir = dir.join("data");
    config.chart.output_dir = dir.join("charts");
    std::fs::create_dir_all(&config.chart.data_dir).expect("Failed to create data dir");
    config
}

/// Model that replays scripted outcomes and records every request
#[derive(Default)]
pub struct ScriptedModel {
    outcomes: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(outcomes: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> llm::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ProviderError("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Renderer that writes a placeholder file instead of drawing
#[derive(Default)]
pub struct StubRenderer {
    pub plans: Mutex<Vec<ChartPlan>>,
}

impl ChartRenderer for StubRenderer {
    fn draw(&self, plan: &ChartPlan, output: &Path) -> Result<(), ChartError> {
        std::fs::write(output, b"\x89PNG stub")?;
        self.plans.lock().unwrap().push(plan.clone());
        Ok(())
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub engine: DispatchEngine,
    pub model: Arc<ScriptedModel>,
    pub delay: Arc<RecordingDelay>,
    pub renderer: Arc<StubRenderer>,
}

impl Harness {
    pub fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    pub fn write_csv(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.data_dir().join(name);
        std::fs::write(&path, content).expect("Failed to write CSV");
        path
    }
}

/// Engine over a fresh temp dir with a scripted model and stub renderer
pub fn harness(model: Arc<ScriptedModel>) -> Harness {
    harness_with(model, |_| {})
}

pub fn harness_with(model: Arc<ScriptedModel>, tweak: impl FnOnce(&mut OrionConfig)) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = offline_config(dir.path());
    tweak(&mut config);

    let delay = Arc::new(RecordingDelay::new());
    let renderer = Arc::new(StubRenderer::default());
    let engine = DispatchEngine::builder(&config)
        .model(model.clone())
        .delay(delay.clone())
        .renderer(renderer.clone())
        .build()
        .expect("Failed to build engine");

    Harness {
        dir,
        engine,
        model,
        delay,
        renderer,
    }
}
