use crate::model::{
    Expense, Money, ParticipantBalances, ParticipantList, SETTLEMENT_TOLERANCE, SettlementRecord,
};

/// Net position of every participant, derived fresh from expenses and
/// recorded settlements.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Positive balance: owed money. Negative: owes money.
    ///
    /// The payer is credited the full amount and then debited their own share
    /// like everyone else. Recorded settlements count whatever their status:
    /// `from` gains `amount` and `to` loses it.
    ///
    /// Entries follow `participants` order; ids that only appear in records
    /// are appended after them.
    pub fn compute<'a, E, S>(
        expenses: E,
        settlements: S,
        participants: &ParticipantList,
    ) -> ParticipantBalances
    where
        E: IntoIterator<Item = &'a Expense>,
        S: IntoIterator<Item = &'a SettlementRecord>,
    {
        let mut balances: ParticipantBalances = participants
            .iter()
            .map(|id| (id.clone(), Money::ZERO))
            .collect();

        let mut expense_count = 0usize;
        for expense in expenses {
            *balances.entry(expense.paid_by().clone()).or_default() += expense.amount();
            for participant in expense.participants() {
                *balances.entry(participant.clone()).or_default() -=
                    expense.share_of(participant);
            }
            expense_count += 1;
        }

        let mut settlement_count = 0usize;
        for settlement in settlements {
            *balances.entry(settlement.from.clone()).or_default() += settlement.amount;
            *balances.entry(settlement.to.clone()).or_default() -= settlement.amount;
            settlement_count += 1;
        }

        tracing::debug!(
            participant_count = balances.len(),
            expense_count,
            settlement_count,
            "balances computed"
        );

        balances
    }

    /// Sum of all balances. Zero for any consistent snapshot.
    pub fn residual(balances: &ParticipantBalances) -> Money {
        balances.values().sum()
    }

    pub fn is_conserved(balances: &ParticipantBalances) -> bool {
        Self::residual(balances).abs() <= SETTLEMENT_TOLERANCE
    }
}
