//! Execution gateway port
//!
//! The core hands sized instructions to an [`ExecutionGateway`] and gets an
//! [`ExecutionReport`] back. Connectivity, retries and order bookkeeping are
//! owned by the implementation; the core only sees "filled", "accepted" or
//! "no fill".

use crate::error::GatewayError;
use crate::messages::{ExecutionReport, FillNotification, TradeInstruction};
use crate::transport::{ChannelRequester, Requester};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use std::time::Duration;

/// Port for submitting trade instructions
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    async fn execute(&self, instruction: &TradeInstruction) -> Result<ExecutionReport, GatewayError>;
}

/// Submit an instruction, converting failures and timeouts into reports.
///
/// A request without a response inside `timeout` is reported as
/// `TimedOut`; a gateway error becomes `Rejected`. Never hangs.
pub async fn execute_with_timeout(
    gateway: &dyn ExecutionGateway,
    instruction: &TradeInstruction,
    timeout: Duration,
) -> ExecutionReport {
    match tokio::time::timeout(timeout, gateway.execute(instruction)).await {
        Ok(Ok(report)) => report,
        Err(_) => {
            warn!(
                "[EXECUTION] No response for {} {} within {:?}",
                instruction.instrument_id, instruction.instruction_id, timeout
            );
            ExecutionReport::timed_out(instruction)
        }
        Ok(Err(e)) => {
            warn!(
                "[EXECUTION] Gateway failed for {} {}: {}",
                instruction.instrument_id, instruction.instruction_id, e
            );
            ExecutionReport::rejected(instruction, e.to_string())
        }
    }
}

/// Paper gateway: fills every instruction immediately at its reference price
#[derive(Debug, Default, Clone)]
pub struct PaperExecutionGateway;

impl PaperExecutionGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionGateway for PaperExecutionGateway {
    async fn execute(&self, instruction: &TradeInstruction) -> Result<ExecutionReport, GatewayError> {
        debug!(
            "[PAPER] Filling {} {} {} @ {}",
            instruction.side, instruction.quantity, instruction.instrument_id, instruction.reference_price
        );
        let fill = FillNotification {
            quantity: instruction.quantity,
            average_price: instruction.reference_price,
            time: Utc::now(),
        };
        Ok(ExecutionReport::filled(instruction, fill))
    }
}

/// Gateway backed by a request/reply channel to an external execution task
pub struct ChannelExecutionGateway {
    requester: ChannelRequester<TradeInstruction, ExecutionReport>,
}

impl ChannelExecutionGateway {
    pub fn new(requester: ChannelRequester<TradeInstruction, ExecutionReport>) -> Self {
        Self { requester }
    }
}

#[async_trait]
impl ExecutionGateway for ChannelExecutionGateway {
    async fn execute(&self, instruction: &TradeInstruction) -> Result<ExecutionReport, GatewayError> {
        let report = self.requester.request(instruction).await?;
        if report.instruction_id != instruction.instruction_id {
            return Err(GatewayError::Execution(format!(
                "report for {} answered instruction {}",
                report.instruction_id, instruction.instruction_id
            )));
        }
        Ok(report)
    }
}
