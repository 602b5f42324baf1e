#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    DEFAULT_EVENT_ID, DEFAULT_EVENT_NAME, DISPLAY_SCALE, Expense, ExpenseDraft,
    ExpenseValidationError, FULL_SHARE, FrozenSet, MAX_AMOUNT, Money, ParticipantBalances,
    ParticipantId, ParticipantList, Percent, SETTLEMENT_TOLERANCE, SettlementInstruction,
    SettlementRecord, SettlementStatus, SplitMap, SplitMode, SplitTotalMismatch,
};
pub use services::{
    BalanceCalculator, MIN_DRAG_SHARE, MarkPaid, PendingConfirmation, Redistribution,
    SettlementCalculator, SettlementWorkflow, SettlementWorkflowError, SplitAllocationError,
    SplitEdit, SplitState, equal_split, split_total, validate_splits,
};
