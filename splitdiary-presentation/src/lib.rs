#![warn(clippy::uninlined_format_args)]

pub mod expense_presenter;
pub mod money_format;
pub mod settlement_presenter;
pub mod split_presenter;
pub mod text_table;

pub use expense_presenter::ExpensePresenter;
pub use money_format::{format_amount, format_signed};
pub use settlement_presenter::SettlementPresenter;
pub use split_presenter::SplitPresenter;
