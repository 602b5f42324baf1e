use splitdiary_domain::{ExpenseValidationError, Money, ParticipantId, SettlementWorkflowError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiaryLoadError {
    #[error("diary {0} not found")]
    NotFound(String),
    #[error("diary {diary_id} could not be read: {reason}")]
    Unreadable { diary_id: String, reason: String },
    #[error("diary document is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseSubmissionError {
    #[error(transparent)]
    Invalid(#[from] ExpenseValidationError),
    #[error("{0} is not a member of this diary")]
    NotInDiary(ParticipantId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkPaidError {
    #[error(transparent)]
    Workflow(#[from] SettlementWorkflowError),
    #[error("cannot mark {requested} as paid, only {outstanding} is outstanding")]
    ExceedsOutstanding { requested: Money, outstanding: Money },
}
