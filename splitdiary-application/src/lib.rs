#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_processor;
pub mod model;
pub mod ports;

pub use error::{DiaryLoadError, ExpenseSubmissionError, MarkPaidError};
pub use ledger_processor::LedgerProcessor;
pub use model::{
    DiaryEvent, DiaryId, DiaryPerson, DiarySnapshot, EventExpenses, LeaveCheck, LedgerSummary,
    ParticipantBalance, ParticipantPosition, SkippedRecords,
};
pub use ports::{DiaryRepository, ParticipantDirectory, SettlementOptimizer};
