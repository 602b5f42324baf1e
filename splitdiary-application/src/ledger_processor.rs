use crate::{
    error::{DiaryLoadError, ExpenseSubmissionError, MarkPaidError},
    model::{
        DiaryId, DiarySnapshot, LeaveCheck, LedgerSummary, ParticipantBalance,
        ParticipantPosition,
    },
    ports::{DiaryRepository, SettlementOptimizer},
};
use chrono::{DateTime, Utc};
use splitdiary_domain::{
    BalanceCalculator, Expense, ExpenseDraft, MarkPaid, ParticipantId, ParticipantList,
    SETTLEMENT_TOLERANCE, SettlementCalculator, SettlementInstruction, SettlementRecord,
    SettlementWorkflow, SettlementWorkflowError,
};

#[derive(Clone, Copy)]
pub struct LedgerProcessor<'a> {
    repository: &'a dyn DiaryRepository,
    optimizer: &'a dyn SettlementOptimizer,
}

impl<'a> LedgerProcessor<'a> {
    pub fn new(repository: &'a dyn DiaryRepository, optimizer: &'a dyn SettlementOptimizer) -> Self {
        Self {
            repository,
            optimizer,
        }
    }

    pub fn load(&self, diary_id: &DiaryId) -> Result<DiarySnapshot, DiaryLoadError> {
        let snapshot = self.repository.load(diary_id)?;
        if snapshot.skipped.total() > 0 {
            tracing::warn!(
                diary_id = %diary_id,
                skipped_expenses = snapshot.skipped.expenses,
                skipped_settlements = snapshot.skipped.settlements,
                "diary loaded with malformed records left out"
            );
        }
        Ok(snapshot)
    }

    /// Balances and outstanding payments for one snapshot.
    ///
    /// A snapshot whose balances do not cancel out is still summarized; the
    /// mismatch is logged and exposed through `conserved` and `residual`.
    pub fn summarize(&self, snapshot: &DiarySnapshot) -> LedgerSummary {
        let balances = BalanceCalculator::compute(
            &snapshot.expenses,
            &snapshot.settlements,
            &snapshot.participants,
        );
        let residual = BalanceCalculator::residual(&balances);
        let conserved = BalanceCalculator::is_conserved(&balances);
        if !conserved {
            tracing::warn!(
                diary_id = %snapshot.diary_id,
                residual = %residual,
                "balances do not sum to zero; snapshot may be inconsistent"
            );
        }

        let instructions = SettlementCalculator.net_against_recorded_settlements(
            self.optimizer.optimize(&balances),
            &snapshot.settlements,
        );

        LedgerSummary {
            balances: balances
                .into_iter()
                .map(|(id, balance)| ParticipantBalance { id, balance })
                .collect(),
            instructions,
            residual,
            conserved,
            pending_confirmations: SettlementWorkflow::pending_confirmations(
                &snapshot.settlements,
            ),
        }
    }

    pub fn position_of(&self, summary: &LedgerSummary, id: &ParticipantId) -> ParticipantPosition {
        let mut position = ParticipantPosition {
            balance: summary.balance_of(id),
            ..ParticipantPosition::default()
        };

        for instruction in &summary.instructions {
            if &instruction.to == id {
                position.to_receive_count += 1;
                position.to_receive_total += instruction.amount;
            } else if &instruction.from == id {
                position.to_pay_count += 1;
                position.to_pay_total += instruction.amount;
            }
        }

        position.awaiting_confirmation = summary
            .pending_confirmations
            .iter()
            .filter(|pending| &pending.from == id)
            .map(|pending| pending.marked)
            .sum();

        position
    }

    /// Gate in front of persisting a new or edited expense.
    pub fn submit_expense(
        &self,
        members: &ParticipantList,
        draft: ExpenseDraft,
    ) -> Result<Expense, ExpenseSubmissionError> {
        if !members.contains(&draft.paid_by) {
            return Err(ExpenseSubmissionError::NotInDiary(draft.paid_by));
        }
        if let Some(outsider) = draft
            .participants
            .iter()
            .find(|participant| !members.contains(*participant))
        {
            return Err(ExpenseSubmissionError::NotInDiary(outsider.clone()));
        }

        let expense = Expense::try_new(draft)?;
        tracing::info!(
            expense_id = expense.id(),
            amount = %expense.amount(),
            participant_count = expense.participants().len(),
            "expense accepted"
        );
        Ok(expense)
    }

    /// Records a partial or full payment claimed by the debtor.
    ///
    /// The claim may not exceed what the current instructions say is owed
    /// between the pair, give or take [`SETTLEMENT_TOLERANCE`].
    pub fn mark_paid(
        &self,
        summary: &LedgerSummary,
        records: &[SettlementRecord],
        request: MarkPaid,
    ) -> Result<Vec<SettlementRecord>, MarkPaidError> {
        let outstanding =
            SettlementWorkflow::outstanding_between(&summary.instructions, &request.from, &request.to);
        if request.amount > outstanding + SETTLEMENT_TOLERANCE {
            return Err(MarkPaidError::ExceedsOutstanding {
                requested: request.amount,
                outstanding,
            });
        }

        let (from, to, amount) = (request.from.clone(), request.to.clone(), request.amount);
        let updated = SettlementWorkflow::mark_paid(records, request)?;
        tracing::info!(%from, %to, %amount, "payment marked as paid");
        Ok(updated)
    }

    pub fn confirm_settlement(
        &self,
        records: &[SettlementRecord],
        settlement_id: &str,
    ) -> Result<Vec<SettlementRecord>, SettlementWorkflowError> {
        let updated = SettlementWorkflow::confirm(records, settlement_id)?;
        tracing::info!(settlement_id, "settlement confirmed");
        Ok(updated)
    }

    pub fn settle_instruction(
        &self,
        instruction: &SettlementInstruction,
        settlement_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<SettlementRecord, SettlementWorkflowError> {
        let record = SettlementWorkflow::settle_instruction(instruction, settlement_id, at)?;
        tracing::info!(
            settlement_id = %record.id,
            from = %record.from,
            to = %record.to,
            amount = %record.amount,
            "instruction settled"
        );
        Ok(record)
    }

    pub fn leave_check(
        &self,
        snapshot: &DiarySnapshot,
        summary: &LedgerSummary,
        id: &ParticipantId,
    ) -> LeaveCheck {
        LeaveCheck {
            has_expenses: snapshot
                .expenses
                .iter()
                .any(|expense| expense.paid_by() == id || expense.participants().contains(id)),
            has_settlements: snapshot
                .settlements
                .iter()
                .any(|record| &record.from == id || &record.to == id),
            pending_instructions: summary
                .instructions
                .iter()
                .filter(|instruction| &instruction.from == id || &instruction.to == id)
                .cloned()
                .collect(),
        }
    }
}
