//! Position Tracking from Execution Reports
//!
//! One book per instrument. Instructions are recorded as pending when they
//! are dispatched; execution reports then move the position along:
//!
//! ```text
//!  pending entry ──fill──► open ──exit fill──► closed (position cleared)
//!        │                   ▲
//!        │                   └── more entry fills re-average the entry price
//!        └──rejected / timed out──► pending cleared
//! ```
//!
//! Registering an entry also sets the daily entry latch. It stays set
//! whatever happens to the instruction and is only cleared by
//! [`PositionBook::start_session`].
//!
//! Reports can arrive late and out of order relative to market data; a
//! report for an instruction the book does not know is an error the caller
//! logs and drops.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use sentinel_core::{Position, PositionSide, Side};
use sentinel_gateway::{ExecutionReport, ExecutionStatus, InstructionTag, TradeInstruction};
use std::collections::HashMap;
use uuid::Uuid;

/// Instruction awaiting its fill
#[derive(Debug, Clone)]
pub struct PendingInstruction {
    pub side: Side,
    pub tag: InstructionTag,
    pub quantity: Decimal,
    pub filled: Decimal,
    /// Volatility when the decision was taken; used if this opens a position
    pub volatility: Decimal,
}

impl PendingInstruction {
    pub fn is_exit(&self) -> bool {
        self.tag.is_exit()
    }
}

/// What a report did to the book
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    /// Acknowledged, still waiting for a fill
    Acknowledged,
    Opened(Position),
    Increased(Position),
    Reduced { position: Position, realized_pnl: Decimal },
    Closed { realized_pnl: Decimal },
    /// Rejected or timed out; the pending record is gone
    Failed { tag: InstructionTag, status: ExecutionStatus },
}

/// Pending instructions and the open position for one instrument
#[derive(Debug, Default)]
pub struct PositionBook {
    instrument_id: String,
    position: Option<Position>,
    pending: HashMap<Uuid, PendingInstruction>,
    realized_pnl: Decimal,
    closed_count: u64,
    entered_today: bool,
}

impl PositionBook {
    pub fn new(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            ..Default::default()
        }
    }

    /// Record a dispatched instruction
    pub fn register(&mut self, instruction: &TradeInstruction, volatility: Decimal) {
        if !instruction.tag.is_exit() {
            self.entered_today = true;
        }
        self.pending.insert(
            instruction.instruction_id,
            PendingInstruction {
                side: instruction.side,
                tag: instruction.tag,
                quantity: instruction.quantity,
                filled: Decimal::ZERO,
                volatility,
            },
        );
    }

    /// Apply an execution report
    pub fn on_report(&mut self, report: &ExecutionReport) -> Result<PositionEvent> {
        if report.instrument_id != self.instrument_id {
            return Err(Error::InstrumentMismatch {
                expected: self.instrument_id.clone(),
                got: report.instrument_id.clone(),
            });
        }
        let Some(pending) = self.pending.get(&report.instruction_id).cloned() else {
            return Err(Error::UnknownInstruction(report.instruction_id));
        };

        match report.status {
            ExecutionStatus::Accepted => Ok(PositionEvent::Acknowledged),
            ExecutionStatus::Rejected | ExecutionStatus::TimedOut => {
                self.pending.remove(&report.instruction_id);
                warn!(
                    "[POSITION] {} {} {} {}: {}",
                    self.instrument_id,
                    pending.tag,
                    pending.side,
                    report.status.as_str(),
                    report.reason.as_deref().unwrap_or("no reason given")
                );
                Ok(PositionEvent::Failed {
                    tag: pending.tag,
                    status: report.status,
                })
            }
            ExecutionStatus::Filled => {
                let fill = report
                    .fill
                    .ok_or(Error::MissingFill(report.instruction_id))?;

                let filled = pending.filled + fill.quantity;
                if filled >= pending.quantity {
                    self.pending.remove(&report.instruction_id);
                } else if let Some(p) = self.pending.get_mut(&report.instruction_id) {
                    p.filled = filled;
                }

                Ok(self.apply_fill(&pending, fill.quantity, fill.average_price, fill.time))
            }
        }
    }

    fn apply_fill(
        &mut self,
        pending: &PendingInstruction,
        quantity: Decimal,
        price: Decimal,
        time: DateTime<Utc>,
    ) -> PositionEvent {
        let fill_side = pending.side.opens();

        match self.position.as_mut() {
            None => {
                let position = Position::new(
                    self.instrument_id.clone(),
                    fill_side,
                    price,
                    quantity,
                    pending.volatility,
                    time,
                );
                info!(
                    "[POSITION] {} opened {:?} {} @ {} ({}), σ at entry {}",
                    self.instrument_id, fill_side, quantity, price, pending.tag, pending.volatility
                );
                self.position = Some(position.clone());
                PositionEvent::Opened(position)
            }
            Some(position) if position.side == fill_side => {
                // Volatility at entry stays with the first fill
                position.increase(quantity, price);
                PositionEvent::Increased(position.clone())
            }
            Some(position) => {
                let realized = position.decrease(quantity, price);
                if position.is_closed() {
                    let total = position.realized_pnl;
                    info!(
                        "[POSITION] {} closed by {} @ {}, realized {}",
                        self.instrument_id, pending.tag, price, total
                    );
                    self.realized_pnl += total;
                    self.closed_count += 1;
                    self.position = None;
                    PositionEvent::Closed { realized_pnl: total }
                } else {
                    PositionEvent::Reduced {
                        position: position.clone(),
                        realized_pnl: realized,
                    }
                }
            }
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn position_side(&self) -> Option<PositionSide> {
        self.position.as_ref().map(|p| p.side)
    }

    /// An entry was registered since the last session start
    pub fn entered_today(&self) -> bool {
        self.entered_today
    }

    /// Clear the daily entry latch. Positions and pending instructions
    /// carry over; late reports for them still apply.
    pub fn start_session(&mut self) {
        self.entered_today = false;
    }

    pub fn has_pending_exit(&self) -> bool {
        self.pending.values().any(|p| p.is_exit())
    }

    pub fn has_pending_entry(&self) -> bool {
        self.pending.values().any(|p| !p.is_exit())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Realized P&L of positions closed so far
    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn closed_count(&self) -> u64 {
        self.closed_count
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }
}
