//! Tick audit trail
//!
//! One append-only [`TickRecord`] per normalized tick, written per instrument
//! as CSV with a fixed column order ([`TickRecord::CSV_COLUMNS`]). Recording is fire-and-forget: the core hands a
//! record to an [`AuditSink`] without waiting, and a slow or failing disk
//! never stalls market-data processing.

use crate::error::{GatewayError, TransportError};
use log::{debug, warn};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use sentinel_core::{Richness, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Snapshot of one instrument's state at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub timestamp: Timestamp,
    pub instrument_id: String,
    pub richness: Richness,
    pub last_price: Option<Decimal>,
    pub last_size: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub bid_size: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub ask_size: Option<Decimal>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    /// Previous session's close, not an intraday value
    pub prev_close: Option<Decimal>,
    pub day_volume: Decimal,
    pub vwap: Option<Decimal>,
}

/// CSV layout of a [`TickRecord`]; field order is column order
#[derive(Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    instrument: &'a str,
    richness: &'static str,
    last_price: Option<Decimal>,
    last_size: Option<Decimal>,
    bid: Option<Decimal>,
    bid_size: Option<Decimal>,
    ask: Option<Decimal>,
    ask_size: Option<Decimal>,
    open: Option<Decimal>,
    high: Option<Decimal>,
    low: Option<Decimal>,
    prev_close: Option<Decimal>,
    day_volume: Decimal,
    vwap: Option<Decimal>,
}

impl<'a> From<&'a TickRecord> for CsvRow<'a> {
    fn from(r: &'a TickRecord) -> Self {
        Self {
            timestamp: r.timestamp.to_rfc3339(),
            instrument: &r.instrument_id,
            richness: r.richness.as_str(),
            last_price: r.last_price,
            last_size: r.last_size,
            bid: r.bid,
            bid_size: r.bid_size,
            ask: r.ask,
            ask_size: r.ask_size,
            open: r.open,
            high: r.high,
            low: r.low,
            prev_close: r.prev_close,
            day_volume: r.day_volume,
            vwap: r.vwap,
        }
    }
}

impl TickRecord {
    pub const CSV_COLUMNS: [&'static str; 15] = [
        "timestamp",
        "instrument",
        "richness",
        "last_price",
        "last_size",
        "bid",
        "bid_size",
        "ask",
        "ask_size",
        "open",
        "high",
        "low",
        "prev_close",
        "day_volume",
        "vwap",
    ];

    /// Encode as one CSV row, preceded by the header row when `with_header`.
    /// Missing values are empty fields; text fields are quoted as needed.
    pub fn to_csv(&self, with_header: bool) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(with_header)
            .from_writer(Vec::new());
        wtr.serialize(CsvRow::from(self))?;
        wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// Port for the audit trail. Implementations must not block the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: TickRecord) -> Result<(), TransportError>;
}

/// In-memory sink, for tests and inspection
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<Vec<TickRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TickRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: TickRecord) -> Result<(), TransportError> {
        self.records.lock().push(record);
        Ok(())
    }
}

/// CSV files under a directory, one `<instrument>.csv` per instrument.
///
/// Records go through a bounded channel to a background writer task; when
/// the channel is full the record is refused and the caller drops it.
pub struct FileAuditSink {
    tx: mpsc::Sender<TickRecord>,
    writer: JoinHandle<()>,
}

impl FileAuditSink {
    /// Create the directory if needed and start the writer task
    pub async fn open(dir: impl AsRef<Path>, capacity: usize) -> Result<Self, GatewayError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let writer = tokio::spawn(write_records(dir, rx));
        Ok(Self { tx, writer })
    }

    /// Stop accepting records and wait until everything queued is on disk
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.writer.await {
            warn!("[AUDIT] Writer task failed: {}", e);
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, record: TickRecord) -> Result<(), TransportError> {
        self.tx.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => TransportError::ChannelClosed,
        })
    }
}

fn file_name(instrument_id: &str) -> String {
    let safe: String = instrument_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    format!("{}.csv", safe)
}

/// One instrument's open audit file
struct AuditFile {
    writer: BufWriter<tokio::fs::File>,
    /// File was created empty; the first row carries the header
    needs_header: bool,
}

async fn open_file(dir: &Path, instrument_id: &str) -> std::io::Result<AuditFile> {
    let path = dir.join(file_name(instrument_id));
    let needs_header = tokio::fs::metadata(&path).await.is_err();
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;

    debug!("[AUDIT] Opened {}", path.display());
    Ok(AuditFile {
        writer: BufWriter::new(file),
        needs_header,
    })
}

async fn write_records(dir: PathBuf, mut rx: mpsc::Receiver<TickRecord>) {
    let mut files: HashMap<String, AuditFile> = HashMap::new();

    while let Some(record) = rx.recv().await {
        if !files.contains_key(&record.instrument_id) {
            match open_file(&dir, &record.instrument_id).await {
                Ok(file) => {
                    files.insert(record.instrument_id.clone(), file);
                }
                Err(e) => {
                    warn!("[AUDIT] Cannot open file for {}: {}", record.instrument_id, e);
                    continue;
                }
            }
        }

        if let Some(file) = files.get_mut(&record.instrument_id) {
            match record.to_csv(file.needs_header) {
                Ok(bytes) => match file.writer.write_all(&bytes).await {
                    Ok(()) => file.needs_header = false,
                    Err(e) => warn!("[AUDIT] Write failed for {}: {}", record.instrument_id, e),
                },
                Err(e) => warn!("[AUDIT] Cannot encode record for {}: {}", record.instrument_id, e),
            }
        }

        if rx.is_empty() {
            flush_all(&mut files).await;
        }
    }

    flush_all(&mut files).await;
}

async fn flush_all(files: &mut HashMap<String, AuditFile>) {
    for (instrument_id, file) in files.iter_mut() {
        if let Err(e) = file.writer.flush().await {
            warn!("[AUDIT] Flush failed for {}: {}", instrument_id, e);
        }
    }
}
