//! `sentinel [config.json] [--audit <dir>] [--anchor <rfc3339>]`
//!
//! Replays JSON-lines `EngineInput` records from stdin through the engine
//! with a paper execution gateway. `--anchor` shifts the engine clock onto
//! the recorded session's time line.

use log::{info, warn};
use sentinel_clock::SystemClock;
use sentinel_gateway::{FileAuditSink, PaperExecutionGateway};
use sentinel_core::Timestamp;
use sentinel_runner::{EngineError, EngineInput, TradingEngine, load_config, load_default_config};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

struct Args {
    config: Option<PathBuf>,
    audit_dir: Option<PathBuf>,
    anchor: Option<Timestamp>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, EngineError> {
    let mut parsed = Args {
        config: None,
        audit_dir: None,
        anchor: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--audit" => {
                let dir = args.next().ok_or_else(|| EngineError::Usage("--audit needs a directory".into()))?;
                parsed.audit_dir = Some(PathBuf::from(dir));
            }
            "--anchor" => {
                let at = args.next().ok_or_else(|| EngineError::Usage("--anchor needs a timestamp".into()))?;
                let at = at
                    .parse::<Timestamp>()
                    .map_err(|e| EngineError::Usage(format!("bad --anchor {}: {}", at, e)))?;
                parsed.anchor = Some(at);
            }
            flag if flag.starts_with("--") => {
                return Err(EngineError::Usage(format!("unknown option {}", flag)));
            }
            path if parsed.config.is_none() => parsed.config = Some(PathBuf::from(path)),
            extra => return Err(EngineError::Usage(format!("unexpected argument {}", extra))),
        }
    }
    Ok(parsed)
}

/// Forward stdin records to the engine; malformed lines are skipped
async fn read_inputs(tx: mpsc::Sender<EngineInput>) -> Result<u64, EngineError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut forwarded = 0;
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input: EngineInput = match serde_json::from_str(line) {
            Ok(input) => input,
            Err(e) => {
                warn!("[FEED] Skipping line {}: {}", line_no, e);
                continue;
            }
        };
        if tx.send(input).await.is_err() {
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    env_logger::init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    let input_buffer = config.input_buffer;
    let audit_buffer = config.audit_buffer;

    let mut engine = TradingEngine::new(
        config,
        Arc::new(PaperExecutionGateway::new()),
        Arc::new(match args.anchor {
            Some(at) => SystemClock::anchored_at(at),
            None => SystemClock::new(),
        }),
    )?;

    let audit = match &args.audit_dir {
        Some(dir) => {
            let sink = Arc::new(FileAuditSink::open(dir, audit_buffer).await?);
            engine.set_audit_sink(sink.clone());
            info!("[MAIN] Auditing ticks to {}", dir.display());
            Some(sink)
        }
        None => None,
    };

    let (tx, rx) = mpsc::channel(input_buffer);
    let reader = tokio::spawn(read_inputs(tx));

    let stats = engine.run(rx).await;
    match reader.await {
        Ok(Ok(forwarded)) => info!("[MAIN] {} input records replayed", forwarded),
        Ok(Err(e)) => warn!("[MAIN] Input reader stopped: {}", e),
        Err(e) => warn!("[MAIN] Input reader task failed: {}", e),
    }

    drop(engine);
    if let Some(sink) = audit {
        match Arc::try_unwrap(sink) {
            Ok(sink) => sink.close().await,
            Err(_) => warn!("[MAIN] Audit sink still shared, pending records may be lost"),
        }
    }

    info!(
        "[MAIN] events={} instructions={} vetoes={} halts={} reports={} anomalies={} unknown={} audit_dropped={}",
        stats.events,
        stats.instructions,
        stats.vetoes,
        stats.halts,
        stats.reports,
        stats.anomalies,
        stats.unknown_handles,
        stats.audit_dropped
    );
    Ok(())
}
