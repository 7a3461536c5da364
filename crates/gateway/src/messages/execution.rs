//! Execution message types

use rust_decimal::Decimal;
use sentinel_core::{InstrumentHandle, Side, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit tag naming what produced an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionTag {
    /// Entry from the opening-range breakout strategy
    OpeningRangeBreakout,
    /// Entry from the tick-based composite signal
    Composite,
    /// Exit on the stop-loss band
    StopLoss,
    /// Exit on the take-profit band
    TakeProfit,
}

impl InstructionTag {
    /// Exits bypass the daily entry latch
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::StopLoss | Self::TakeProfit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpeningRangeBreakout => "orb",
            Self::Composite => "composite",
            Self::StopLoss => "stop_loss",
            Self::TakeProfit => "take_profit",
        }
    }
}

impl std::fmt::Display for InstructionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sized trade instruction sent to the execution gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInstruction {
    /// Correlation id echoed back on every report
    pub instruction_id: Uuid,
    /// Stable instrument identifier
    pub instrument_id: String,
    /// Subscription handle the instruction was produced for
    pub handle: InstrumentHandle,
    pub side: Side,
    pub quantity: Decimal,
    /// Last price when the decision was taken
    pub reference_price: Decimal,
    pub tag: InstructionTag,
    pub created_at: Timestamp,
}

impl TradeInstruction {
    pub fn new(
        instrument_id: impl Into<String>,
        handle: InstrumentHandle,
        side: Side,
        quantity: Decimal,
        reference_price: Decimal,
        tag: InstructionTag,
        created_at: Timestamp,
    ) -> Self {
        Self {
            instruction_id: Uuid::new_v4(),
            instrument_id: instrument_id.into(),
            handle,
            side,
            quantity,
            reference_price,
            tag,
            created_at,
        }
    }

    /// Notional value at the reference price
    pub fn notional(&self) -> Decimal {
        self.quantity * self.reference_price
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Instruction accepted, no fill yet
    Accepted,
    /// Instruction rejected by the gateway
    Rejected,
    /// Instruction (partially or fully) filled
    Filled,
    /// No response within the bounded window
    TimedOut,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Filled => "filled",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Fill details
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillNotification {
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub time: Timestamp,
}

/// Report from the execution gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub instruction_id: Uuid,
    pub instrument_id: String,
    pub handle: InstrumentHandle,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub fill: Option<FillNotification>,
    /// Rejection or failure reason
    #[serde(default)]
    pub reason: Option<String>,
}

impl ExecutionReport {
    pub fn accepted(instruction: &TradeInstruction) -> Self {
        Self::with_status(instruction, ExecutionStatus::Accepted)
    }

    pub fn filled(instruction: &TradeInstruction, fill: FillNotification) -> Self {
        Self {
            fill: Some(fill),
            ..Self::with_status(instruction, ExecutionStatus::Filled)
        }
    }

    pub fn rejected(instruction: &TradeInstruction, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::with_status(instruction, ExecutionStatus::Rejected)
        }
    }

    pub fn timed_out(instruction: &TradeInstruction) -> Self {
        Self::with_status(instruction, ExecutionStatus::TimedOut)
    }

    fn with_status(instruction: &TradeInstruction, status: ExecutionStatus) -> Self {
        Self {
            instruction_id: instruction.instruction_id,
            instrument_id: instruction.instrument_id.clone(),
            handle: instruction.handle,
            status,
            fill: None,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn instruction(tag: InstructionTag) -> TradeInstruction {
        TradeInstruction::new(
            "AAPL",
            InstrumentHandle(1),
            Side::Buy,
            dec!(100),
            dec!(180.50),
            tag,
            Utc::now(),
        )
    }

    #[test]
    fn test_instruction_notional() {
        assert_eq!(
            instruction(InstructionTag::Composite).notional(),
            dec!(18050)
        );
    }

    #[test]
    fn test_exit_tags() {
        assert!(InstructionTag::StopLoss.is_exit());
        assert!(InstructionTag::TakeProfit.is_exit());
        assert!(!InstructionTag::OpeningRangeBreakout.is_exit());
        assert!(!InstructionTag::Composite.is_exit());
    }

    #[test]
    fn test_reports_echo_instruction() {
        let instr = instruction(InstructionTag::OpeningRangeBreakout);
        let fill = FillNotification {
            quantity: dec!(100),
            average_price: dec!(180.55),
            time: Utc::now(),
        };

        let report = ExecutionReport::filled(&instr, fill);
        assert_eq!(report.instruction_id, instr.instruction_id);
        assert_eq!(report.status, ExecutionStatus::Filled);
        assert_eq!(report.fill.map(|f| f.average_price), Some(dec!(180.55)));

        let rejected = ExecutionReport::rejected(&instr, "no route");
        assert_eq!(rejected.status, ExecutionStatus::Rejected);
        assert_eq!(rejected.reason.as_deref(), Some("no route"));
        assert_eq!(ExecutionReport::timed_out(&instr).status.as_str(), "timed_out");
    }
}
