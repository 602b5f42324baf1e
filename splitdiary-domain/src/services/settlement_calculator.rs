use crate::model::{
    Money, ParticipantBalances, ParticipantId, SETTLEMENT_TOLERANCE, SettlementInstruction,
    SettlementRecord,
};

/// Settlement calculation service
pub struct SettlementCalculator;

struct OpenPosition<'a> {
    id: &'a ParticipantId,
    remaining: Money,
}

impl SettlementCalculator {
    /// Reduce balances to debtor -> creditor payments
    ///
    /// Largest creditor is matched with largest debtor first. Balances within
    /// [`SETTLEMENT_TOLERANCE`] of zero are treated as settled. Equal
    /// magnitudes keep the order they have in `balances`.
    ///
    /// # Returns
    /// At most `creditors + debtors - 1` instructions, each above the tolerance
    pub fn simplify(&self, balances: &ParticipantBalances) -> Vec<SettlementInstruction> {
        let mut creditors: Vec<OpenPosition<'_>> = Vec::new();
        let mut debtors: Vec<OpenPosition<'_>> = Vec::new();
        for (id, &balance) in balances {
            if balance > SETTLEMENT_TOLERANCE {
                creditors.push(OpenPosition {
                    id,
                    remaining: balance,
                });
            } else if balance < -SETTLEMENT_TOLERANCE {
                debtors.push(OpenPosition {
                    id,
                    remaining: -balance,
                });
            }
        }

        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut instructions =
            Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
        let (mut i, mut j) = (0, 0);
        while i < creditors.len() && j < debtors.len() {
            let amount = creditors[i].remaining.min(debtors[j].remaining);
            if amount > SETTLEMENT_TOLERANCE {
                instructions.push(SettlementInstruction {
                    from: debtors[j].id.clone(),
                    to: creditors[i].id.clone(),
                    amount,
                });
            }

            creditors[i].remaining -= amount;
            debtors[j].remaining -= amount;

            if creditors[i].remaining < SETTLEMENT_TOLERANCE {
                i += 1;
            }
            if debtors[j].remaining < SETTLEMENT_TOLERANCE {
                j += 1;
            }
        }

        tracing::debug!(
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            instruction_count = instructions.len(),
            "debts simplified"
        );

        instructions
    }

    /// Instructions still owed after past payments.
    ///
    /// Balances from [`BalanceCalculator`](crate::services::BalanceCalculator)
    /// already include every recorded settlement, so the instructions pass
    /// through untouched. Subtracting `recorded` again would count each
    /// payment twice.
    pub fn net_against_recorded_settlements(
        &self,
        instructions: Vec<SettlementInstruction>,
        _recorded: &[SettlementRecord],
    ) -> Vec<SettlementInstruction> {
        instructions
    }
}
