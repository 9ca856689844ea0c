//! Scripted renderer and recording sink shared by the crate's tests.

use crate::company::Company;
use crate::error::{PageError, SinkError};
use crate::records::{DiversityRecord, OutputFile, Record};
use crate::renderer::{Identity, PageRenderer, RendererFactory};
use crate::sink::ResultSink;
use async_trait::async_trait;
use log::{Level, LevelFilter, Log, Metadata, Record as LogRecord};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::Once;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    Missing,
    Crash,
    Other,
}

/// Canned content for one URL
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    html: String,
    payload: String,
    failure: Option<Failure>,
    diversity: Vec<DiversityRecord>,
}

impl FakePage {
    pub fn html(html: &str) -> Self {
        Self {
            html: html.to_string(),
            ..Self::default()
        }
    }

    pub fn payload(mut self, payload: &str) -> Self {
        self.payload = payload.to_string();
        self
    }

    pub fn diversity(mut self, records: Vec<DiversityRecord>) -> Self {
        self.diversity = records;
        self
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn timeout() -> Self {
        Self::failing(Failure::Timeout)
    }
}

#[derive(Default)]
struct ScriptState {
    pages: HashMap<String, FakePage>,
    visits: Vec<String>,
    waits: Vec<String>,
    identities: Vec<String>,
    live: usize,
    max_live: usize,
    created: usize,
    closed: usize,
    failing_creates: usize,
    failing_close: bool,
}

/// Shared script of page contents plus a record of what the fakes did
#[derive(Clone, Default)]
pub struct Script {
    state: Arc<Mutex<ScriptState>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.lock().pages.insert(url.to_string(), page);
        self
    }

    pub fn failing_creates(self, count: usize) -> Self {
        self.lock().failing_creates = count;
        self
    }

    pub fn failing_close(self) -> Self {
        self.lock().failing_close = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap()
    }

    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    pub fn waits(&self) -> Vec<String> {
        self.lock().waits.clone()
    }

    pub fn identities(&self) -> Vec<String> {
        self.lock().identities.clone()
    }

    pub fn live(&self) -> usize {
        self.lock().live
    }

    pub fn max_live(&self) -> usize {
        self.lock().max_live
    }

    pub fn created(&self) -> usize {
        self.lock().created
    }

    pub fn closed(&self) -> usize {
        self.lock().closed
    }
}

pub struct FakeRenderer {
    script: Script,
    current: Option<FakePage>,
}

impl FakeRenderer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            current: None,
        }
    }

    fn current(&self) -> FakePage {
        self.current.clone().unwrap_or_default()
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        let page = {
            let mut state = self.script.lock();
            state.visits.push(url.to_string());
            state.pages.get(url).cloned().unwrap_or_default()
        };

        let failure = page.failure;
        self.current = Some(page);
        match failure {
            None => Ok(()),
            Some(Failure::Timeout) => Err(PageError::PageLoadTimeout {
                condition: url.to_string(),
                timeout: Duration::from_secs(10),
            }),
            Some(Failure::Missing) => Err(PageError::ElementNotFound(url.to_string())),
            Some(Failure::Crash) => {
                Err(PageError::RendererFault("chrome not reachable".to_string()))
            }
            Some(Failure::Other) => Err(PageError::Unclassified("boom".to_string())),
        }
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<(), PageError> {
        self.script.lock().waits.push(selector.to_string());
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String, PageError> {
        Ok(self.current().html)
    }

    async fn execute_script(&mut self, _script: &str) -> Result<String, PageError> {
        Ok(self.current().payload)
    }

    async fn close(&mut self) -> Result<(), PageError> {
        let mut state = self.script.lock();
        state.live -= 1;
        state.closed += 1;
        if state.failing_close {
            return Err(PageError::RendererFault("close failed".to_string()));
        }
        Ok(())
    }

    async fn diversity_breakdown(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> Result<Vec<DiversityRecord>, PageError> {
        self.navigate(url).await?;
        Ok(self.current().diversity)
    }
}

pub struct FakeFactory {
    script: Script,
}

impl FakeFactory {
    pub fn new(script: Script) -> Self {
        Self { script }
    }
}

#[async_trait]
impl RendererFactory for FakeFactory {
    type Renderer = FakeRenderer;

    async fn create(&self, identity: &Identity) -> Result<FakeRenderer, PageError> {
        {
            let mut state = self.script.lock();
            if state.failing_creates > 0 {
                state.failing_creates -= 1;
                return Err(PageError::RendererFault("webdriver unavailable".to_string()));
            }
            state.live += 1;
            state.max_live = state.max_live.max(state.live);
            state.created += 1;
            state.identities.push(identity.user_agent.clone());
        }
        Ok(FakeRenderer::new(self.script.clone()))
    }
}

/// Sink that keeps rows in memory as JSON values
#[derive(Default)]
pub struct RecordingSink {
    pub prepared: Vec<(Company, OutputFile)>,
    pub rows: HashMap<OutputFile, Vec<serde_json::Value>>,
    pub appends: Vec<(OutputFile, usize)>,
    pub fail_on: Option<OutputFile>,
    pub fail_prepare: bool,
}

impl RecordingSink {
    pub fn rows(&self, file: OutputFile) -> &[serde_json::Value] {
        self.rows.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ResultSink for RecordingSink {
    fn prepare(&mut self, company: &Company, files: &[OutputFile]) -> Result<(), SinkError> {
        if self.fail_prepare {
            return Err(SinkError::Setup {
                path: company.name.clone().into(),
                source: std::io::Error::other("read-only filesystem"),
            });
        }
        for &file in files {
            self.prepared.push((company.clone(), file));
        }
        Ok(())
    }

    fn append<R: Record>(&mut self, _company: &Company, records: &[R]) -> Result<usize, SinkError> {
        if self.fail_on == Some(R::FILE) {
            return Err(SinkError::Io(std::io::Error::other("disk full")));
        }
        let rows = self.rows.entry(R::FILE).or_default();
        for record in records {
            rows.push(serde_json::to_value(record).map_err(|e| SinkError::Io(e.into()))?);
        }
        self.appends.push((R::FILE, records.len()));
        Ok(records.len())
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Logger that keeps this crate's records per thread
struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with("review_harvest")
    }

    fn log(&self, record: &LogRecord<'_>) {
        if self.enabled(record.metadata()) {
            let line = record.args().to_string();
            CAPTURED.with(|captured| captured.borrow_mut().push((record.level(), line)));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;
static INSTALL: Once = Once::new();

/// Log lines emitted on the current thread since `capture_logs` was called
///
/// Single-threaded tokio tests log on the test's own thread, so parallel
/// tests do not see each other's records.
pub struct LogCapture;

pub fn capture_logs() -> LogCapture {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
    LogCapture
}

impl LogCapture {
    pub fn at(&self, level: Level) -> Vec<String> {
        CAPTURED.with(|captured| {
            captured
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, line)| line.clone())
                .collect()
        })
    }
}
