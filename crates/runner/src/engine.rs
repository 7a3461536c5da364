//! Trading engine
//!
//! Consumes one ordered stream of [`EngineInput`] and fans it out to the
//! per-instrument workers:
//!
//! ```text
//!  EngineInput ──► run() ──┬─ Feed ────► worker[handle] ──► Decision
//!   (ordered)              │                 │                 │ Trade
//!                          │                 │ TickRecord      ▼
//!                          │                 ▼            tokio::spawn
//!                          │             AuditSink        execute_with_timeout
//!                          │                                   │
//!                          ├─ Session ──► every worker (barrier)
//!                          │                                   │
//!                          └─ Execution ◄──── ExecutionReport ◄┘
//! ```
//!
//! Everything on the feed path is synchronous. Gateway calls and audit
//! writes never block it: instructions run on spawned tasks and their
//! reports re-enter the loop as `Execution` inputs, possibly after further
//! ticks for the same instrument.

use crate::config::{ConfigError, EngineConfig};
use crate::worker::{InstrumentWorker, WorkerContext};
use dashmap::DashMap;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use sentinel_analytics::SectorStrength;
use sentinel_clock::Clock;
use sentinel_core::{InstrumentHandle, PreviousDay, Timestamp};
use sentinel_gateway::{
    AuditSink, ExecutionGateway, ExecutionReport, FeedEvent, GatewayError, SessionEvent,
    TradeInstruction, execute_with_timeout,
};
use sentinel_market_data::{InstrumentRegistry, MarketSnapshot};
use sentinel_order_manager::{Decision, DecisionCascade};
use sentinel_risk_manager::{RiskEngine, ShortAvailability};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed input record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Usage: sentinel [config.json] [--audit <dir>]: {0}")]
    Usage(String),
}

/// One record on the engine's ordered input stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineInput {
    Feed(FeedEvent),
    Session(SessionEvent),
    Execution(ExecutionReport),
}

/// Counters since startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub events: u64,
    pub unknown_handles: u64,
    pub anomalies: u64,
    pub instructions: u64,
    pub vetoes: u64,
    /// Ticks the circuit breaker answered with HALT
    pub halts: u64,
    pub reports: u64,
    pub audit_dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    events: AtomicU64,
    unknown_handles: AtomicU64,
    anomalies: AtomicU64,
    instructions: AtomicU64,
    vetoes: AtomicU64,
    halts: AtomicU64,
    reports: AtomicU64,
    audit_dropped: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStats {
        EngineStats {
            events: self.events.load(Ordering::Relaxed),
            unknown_handles: self.unknown_handles.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            instructions: self.instructions.load(Ordering::Relaxed),
            vetoes: self.vetoes.load(Ordering::Relaxed),
            halts: self.halts.load(Ordering::Relaxed),
            reports: self.reports.load(Ordering::Relaxed),
            audit_dropped: self.audit_dropped.load(Ordering::Relaxed),
        }
    }
}

pub struct TradingEngine {
    config: EngineConfig,
    registry: Arc<InstrumentRegistry>,
    sectors: Arc<SectorStrength>,
    workers: DashMap<InstrumentHandle, Arc<Mutex<InstrumentWorker>>>,
    cascade: DecisionCascade,
    gateway: Arc<dyn ExecutionGateway>,
    audit: Option<Arc<dyn AuditSink>>,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl TradingEngine {
    /// Build the engine and register the configured instruments
    pub fn new(
        config: EngineConfig,
        gateway: Arc<dyn ExecutionGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let risk = Arc::new(RiskEngine::new(config.risk.clone()));
        Self::with_risk_engine(config, risk, gateway, clock)
    }

    /// Build with a custom short-availability source
    pub fn with_availability(
        config: EngineConfig,
        availability: Arc<dyn ShortAvailability>,
        gateway: Arc<dyn ExecutionGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let risk = Arc::new(RiskEngine::with_availability(config.risk.clone(), availability));
        Self::with_risk_engine(config, risk, gateway, clock)
    }

    fn with_risk_engine(
        config: EngineConfig,
        risk: Arc<RiskEngine>,
        gateway: Arc<dyn ExecutionGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let engine = Self {
            registry: Arc::new(InstrumentRegistry::new()),
            sectors: Arc::new(SectorStrength::new(config.analytics.sector_threshold)),
            workers: DashMap::new(),
            cascade: DecisionCascade::new(risk, config.exits.clone()),
            gateway,
            audit: None,
            clock,
            counters: Counters::default(),
            config,
        };
        for symbol in engine.config.instruments.clone() {
            engine.add_instrument(&symbol);
        }
        Ok(engine)
    }

    /// Attach the audit sink. Set before `run`.
    pub fn set_audit_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.audit = Some(sink);
    }

    /// Register an instrument and create its worker; idempotent
    pub fn add_instrument(&self, symbol: &str) -> InstrumentHandle {
        let handle = self.registry.register(symbol);
        self.workers.entry(handle).or_insert_with(|| {
            info!("[ENGINE] Tracking {} as {}", symbol, handle);
            Arc::new(Mutex::new(InstrumentWorker::new(symbol, handle, &self.config)))
        });
        handle
    }

    /// Process inputs in order until the stream closes and every dispatched
    /// instruction has reported back
    pub async fn run(&self, mut input: mpsc::Receiver<EngineInput>) -> EngineStats {
        let (report_tx, mut report_rx) = mpsc::channel::<ExecutionReport>(self.config.input_buffer);
        let mut input_open = true;
        let mut in_flight = 0usize;

        info!("[ENGINE] Started with {} instruments", self.workers.len());

        loop {
            tokio::select! {
                received = input.recv(), if input_open => match received {
                    Some(item) => {
                        for instruction in self.handle_input(item) {
                            self.dispatch(instruction, report_tx.clone());
                            in_flight += 1;
                        }
                    }
                    None => {
                        debug!("[ENGINE] Input closed, {} instructions in flight", in_flight);
                        input_open = false;
                    }
                },
                Some(report) = report_rx.recv(), if in_flight > 0 => {
                    in_flight -= 1;
                    self.handle_input(EngineInput::Execution(report));
                }
                else => break,
            }

            if !input_open && in_flight == 0 {
                break;
            }
        }

        let stats = self.stats();
        info!("[ENGINE] Stopped: {:?}", stats);
        stats
    }

    /// Apply one input synchronously; returns the instructions to dispatch
    pub fn handle_input(&self, input: EngineInput) -> Vec<TradeInstruction> {
        match input {
            EngineInput::Feed(event) => self.on_feed(&event).into_iter().collect(),
            EngineInput::Session(event) => {
                self.on_session(&event);
                Vec::new()
            }
            EngineInput::Execution(report) => {
                self.on_report(&report);
                Vec::new()
            }
        }
    }

    fn on_feed(&self, event: &FeedEvent) -> Option<TradeInstruction> {
        Counters::bump(&self.counters.events);

        let handle = event.handle();
        let Some(worker) = self.worker(handle) else {
            Counters::bump(&self.counters.unknown_handles);
            debug!("[ENGINE] Dropping {} for unknown handle {}", event.kind(), handle);
            return None;
        };

        let ctx = WorkerContext {
            cascade: &self.cascade,
            sectors: &self.sectors,
            benchmark: self.config.analytics.benchmark_sector.as_deref(),
            now: self.clock.now(),
        };
        let outcome = worker.lock().on_feed(event, &ctx);

        if outcome.anomaly {
            Counters::bump(&self.counters.anomalies);
        }
        if let Some(tick) = outcome.tick {
            self.audit(tick);
        }

        match outcome.decision? {
            Decision::Trade(instruction) => {
                Counters::bump(&self.counters.instructions);
                Some(instruction)
            }
            Decision::Vetoed { side, reason } => {
                Counters::bump(&self.counters.vetoes);
                debug!("[ENGINE] {} {} vetoed: {}", handle, side, reason);
                None
            }
            Decision::Halt => {
                Counters::bump(&self.counters.halts);
                None
            }
            Decision::Suppressed { .. } | Decision::Hold => None,
        }
    }

    /// Session boundaries lock and reset every worker before returning
    fn on_session(&self, event: &SessionEvent) {
        info!("[ENGINE] Session event: {}", event.name());
        match event {
            SessionEvent::NewTradingDay {
                date,
                session_open,
                reference,
            } => {
                self.sectors.clear();
                self.reset_all(reference, *session_open);
                info!("[ENGINE] Trading day {} ready for {} instruments", date, self.workers.len());
            }
            SessionEvent::OpeningRangeElapsed => {
                for entry in self.workers.iter() {
                    entry.value().lock().on_range_elapsed();
                }
            }
        }
    }

    fn reset_all(&self, reference: &HashMap<String, PreviousDay>, session_open: Option<Timestamp>) {
        for entry in self.workers.iter() {
            let mut worker = entry.value().lock();
            let previous_day = reference.get(worker.symbol());
            worker.start_session(previous_day, session_open);
        }
    }

    fn on_report(&self, report: &ExecutionReport) {
        Counters::bump(&self.counters.reports);

        let worker = self
            .registry
            .handle_of(&report.instrument_id)
            .and_then(|handle| self.worker(handle));
        let Some(worker) = worker else {
            warn!(
                "[ENGINE] Report {} for untracked instrument {}",
                report.instruction_id, report.instrument_id
            );
            return;
        };

        if let Err(e) = worker.lock().on_report(report) {
            warn!("[ENGINE] Ignoring report {}: {}", report.instruction_id, e);
        }
    }

    fn dispatch(&self, instruction: TradeInstruction, reports: mpsc::Sender<ExecutionReport>) {
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.config.execution_timeout();
        tokio::spawn(async move {
            let report = execute_with_timeout(gateway.as_ref(), &instruction, timeout).await;
            if reports.send(report).await.is_err() {
                error!(
                    "[ENGINE] Engine stopped before report for {} arrived",
                    instruction.instruction_id
                );
            }
        });
    }

    fn audit(&self, tick: sentinel_gateway::TickRecord) {
        let Some(sink) = &self.audit else {
            return;
        };
        if let Err(e) = sink.record(tick) {
            Counters::bump(&self.counters.audit_dropped);
            warn!("[ENGINE] Audit record dropped: {}", e);
        }
    }

    fn worker(&self, handle: InstrumentHandle) -> Option<Arc<Mutex<InstrumentWorker>>> {
        self.workers.get(&handle).map(|w| Arc::clone(w.value()))
    }

    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn sectors(&self) -> &SectorStrength {
        &self.sectors
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current snapshot of one instrument
    pub fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        let handle = self.registry.handle_of(symbol)?;
        Some(self.worker(handle)?.lock().snapshot())
    }

    /// Run a closure against one instrument's worker
    pub fn with_worker<R>(&self, symbol: &str, f: impl FnOnce(&InstrumentWorker) -> R) -> Option<R> {
        let handle = self.registry.handle_of(symbol)?;
        let worker = self.worker(handle)?;
        let guard = worker.lock();
        Some(f(&guard))
    }
}
