use splitdiary_application::SettlementOptimizer;
use splitdiary_domain::{ParticipantBalances, SettlementCalculator, SettlementInstruction};

/// Largest-creditor/largest-debtor matching from the domain.
#[derive(Default)]
pub struct GreedySettlementOptimizer;

impl SettlementOptimizer for GreedySettlementOptimizer {
    fn optimize(&self, balances: &ParticipantBalances) -> Vec<SettlementInstruction> {
        SettlementCalculator.simplify(balances)
    }
}
