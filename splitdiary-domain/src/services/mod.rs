pub mod balance_calculator;
pub mod settlement_calculator;
pub mod settlement_workflow;
pub mod split_allocator;

pub use balance_calculator::BalanceCalculator;
pub use settlement_calculator::SettlementCalculator;
pub use settlement_workflow::{
    MarkPaid, PendingConfirmation, SettlementWorkflow, SettlementWorkflowError,
};
pub use split_allocator::{
    MIN_DRAG_SHARE, Redistribution, SplitAllocationError, SplitEdit, SplitState, equal_split,
    split_total, validate_splits,
};
