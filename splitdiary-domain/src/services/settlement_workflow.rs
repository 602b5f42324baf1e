//! Status workflow for recorded settlements.
//!
//! `pending -> marked_paid -> confirmed`, or `pending -> confirmed` when a
//! creditor accepts a computed instruction directly. Status never changes
//! balance math; see [`BalanceCalculator`](crate::services::BalanceCalculator).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

use crate::model::{
    MAX_AMOUNT, Money, ParticipantId, SettlementInstruction, SettlementRecord, SettlementStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementWorkflowError {
    #[error("settlement amount must be positive (got {0})")]
    NonPositiveAmount(Money),
    #[error("settlement amount {0} exceeds the largest supported amount")]
    AmountTooLarge(Money),
    #[error("{0} cannot settle with themselves")]
    SelfSettlement(ParticipantId),
    #[error("settlement {0} not found")]
    NotFound(String),
    #[error("settlement {0} is already confirmed")]
    AlreadyConfirmed(String),
}

/// A debtor's claim that they paid part of what they owe.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkPaid {
    /// Used only when no open `marked_paid` record exists for the pair.
    pub id: String,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    pub marked_by: String,
    pub at: DateTime<Utc>,
}

/// All `marked_paid` amounts between one pair, waiting for the creditor.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub marked: Money,
    /// The record a confirmation should target.
    pub latest: SettlementRecord,
}

pub struct SettlementWorkflow;

impl SettlementWorkflow {
    /// Adds `request` to the pair's open `marked_paid` record, or appends a new
    /// one. Keeping a single record per pair means there is exactly one entry
    /// to net out, stamped with the last time it was marked.
    pub fn mark_paid(
        records: &[SettlementRecord],
        request: MarkPaid,
    ) -> Result<Vec<SettlementRecord>, SettlementWorkflowError> {
        if request.amount.signum() <= 0 {
            return Err(SettlementWorkflowError::NonPositiveAmount(request.amount));
        }
        if request.amount > MAX_AMOUNT {
            return Err(SettlementWorkflowError::AmountTooLarge(request.amount));
        }
        if request.from == request.to {
            return Err(SettlementWorkflowError::SelfSettlement(request.from));
        }

        let mut updated = records.to_vec();
        let existing = updated.iter_mut().find(|record| {
            record.status == SettlementStatus::MarkedPaid
                && record.from == request.from
                && record.to == request.to
        });

        match existing {
            Some(record) => {
                record.amount += request.amount;
                record.marked_paid_at = Some(request.at);
                tracing::debug!(
                    settlement_id = %record.id,
                    from = %record.from,
                    to = %record.to,
                    total = %record.amount,
                    "marked payment merged into open record"
                );
            }
            None => {
                tracing::debug!(
                    settlement_id = %request.id,
                    from = %request.from,
                    to = %request.to,
                    amount = %request.amount,
                    "new marked payment recorded"
                );
                updated.push(SettlementRecord {
                    id: request.id,
                    from: request.from,
                    to: request.to,
                    amount: request.amount,
                    date: request.at,
                    status: SettlementStatus::MarkedPaid,
                    marked_paid_by: Some(request.marked_by),
                    marked_paid_at: Some(request.at),
                });
            }
        }

        Ok(updated)
    }

    pub fn confirm(
        records: &[SettlementRecord],
        settlement_id: &str,
    ) -> Result<Vec<SettlementRecord>, SettlementWorkflowError> {
        let mut updated = records.to_vec();
        let record = updated
            .iter_mut()
            .find(|record| record.id == settlement_id)
            .ok_or_else(|| SettlementWorkflowError::NotFound(settlement_id.to_owned()))?;

        if !record.status.can_transition_to(SettlementStatus::Confirmed) {
            return Err(SettlementWorkflowError::AlreadyConfirmed(record.id.clone()));
        }
        record.status = SettlementStatus::Confirmed;

        Ok(updated)
    }

    /// The creditor accepts a computed instruction as paid in full.
    pub fn settle_instruction(
        instruction: &SettlementInstruction,
        id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<SettlementRecord, SettlementWorkflowError> {
        if instruction.amount.signum() <= 0 {
            return Err(SettlementWorkflowError::NonPositiveAmount(instruction.amount));
        }
        if instruction.from == instruction.to {
            return Err(SettlementWorkflowError::SelfSettlement(
                instruction.from.clone(),
            ));
        }

        Ok(SettlementRecord {
            id: id.into(),
            from: instruction.from.clone(),
            to: instruction.to.clone(),
            amount: instruction.amount,
            date: at,
            status: SettlementStatus::Confirmed,
            marked_paid_by: None,
            marked_paid_at: None,
        })
    }

    /// `marked_paid` records grouped by pair, in first-seen order.
    pub fn pending_confirmations(records: &[SettlementRecord]) -> Vec<PendingConfirmation> {
        let mut grouped: IndexMap<(&ParticipantId, &ParticipantId), PendingConfirmation> =
            IndexMap::new();

        for record in records
            .iter()
            .filter(|record| record.status == SettlementStatus::MarkedPaid)
        {
            grouped
                .entry((&record.from, &record.to))
                .and_modify(|pending| {
                    pending.marked += record.amount;
                    pending.latest = record.clone();
                })
                .or_insert_with(|| PendingConfirmation {
                    from: record.from.clone(),
                    to: record.to.clone(),
                    marked: record.amount,
                    latest: record.clone(),
                });
        }

        grouped.into_values().collect()
    }

    /// What is still owed from `from` to `to` according to the current
    /// instructions.
    pub fn outstanding_between(
        instructions: &[SettlementInstruction],
        from: &ParticipantId,
        to: &ParticipantId,
    ) -> Money {
        instructions
            .iter()
            .filter(|instruction| &instruction.from == from && &instruction.to == to)
            .map(|instruction| instruction.amount)
            .sum()
    }
}
