#![warn(clippy::uninlined_format_args)]

use std::fmt::{self, Display};

pub mod strings {
    pub const PARTICIPANT: &str = "Participant";
    pub const BALANCE: &str = "Balance";
    pub const BALANCES: &str = "Balances";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const AMOUNT: &str = "Amount";
    pub const SPLIT: &str = "Split";
    pub const PENDING_SETTLEMENTS: &str = "Pending settlements";
    pub const MARKED_AS_PAID: &str = "Marked as paid (pending confirmation)";
    pub const ALL_SETTLED_UP: &str = "All settled up!";
    pub const FROZEN_MARKER: &str = "🔒";
    pub const TO_RECEIVE: &str = "To receive";
    pub const TO_PAY: &str = "To pay";
    pub const AWAITING_CONFIRMATION: &str = "Awaiting confirmation";
    pub const CANNOT_LEAVE: &str = "You cannot leave this diary because:";
    pub const PART_OF_EXPENSES: &str = "You are part of active expenses";
    pub const HAS_SETTLEMENT_RECORDS: &str = "You have settlement records";
    pub const HAS_PENDING_SETTLEMENTS: &str = "You have pending settlements:";
    pub const HOW_TO_LEAVE: &str = "To leave:\n1. Settle all pending amounts\n2. Have another member remove you from all expenses";
    pub const EXPENSES: &str = "Expenses";
    pub const SETTLED_TRANSACTIONS: &str = "Settled transactions";
    pub const STATUS_PENDING: &str = "pending";
    pub const STATUS_MARKED_PAID: &str = "marked as paid";
    pub const STATUS_CONFIRMED: &str = "confirmed";
    pub const FREE_TO_LEAVE: &str = "Nothing is holding you in this diary.";
    pub const USAGE: &str = "Usage: splitdiary <diary.json> [participant-id]";
}

pub use strings::*;

pub fn split_total(total: u32) -> String {
    if total == 100 {
        "✓ Total: 100%".to_string()
    } else {
        format!("⚠ Total: {total}%, must be 100%")
    }
}

pub fn owes(debtor: impl Display, creditor: impl Display, amount: impl Display) -> String {
    format!("{debtor} owes {creditor} {amount}")
}

pub fn you_owe(creditor: impl Display, amount: impl Display) -> String {
    format!("You owe {creditor} {amount}")
}

pub fn owes_you(debtor: impl Display, amount: impl Display) -> String {
    format!("{debtor} owes you {amount}")
}

pub fn marked_as_paid(debtor: impl Display, creditor: impl Display, amount: impl Display) -> String {
    format!("{debtor} marked {amount} as paid to {creditor}")
}

pub fn payment_count(count: usize, total: impl Display) -> String {
    match count {
        1 => format!("1 payment, {total}"),
        _ => format!("{count} payments, {total}"),
    }
}

pub fn expense_heading(
    description: impl Display,
    amount: impl Display,
    payer: impl Display,
) -> String {
    format!("{description}: {amount} paid by {payer}")
}

pub fn event_heading(name: impl Display, expense_count: usize) -> String {
    format!("{name} ({expense_count})")
}

pub fn your_balance(amount: impl Display) -> String {
    format!("Your balance: {amount}")
}

pub fn settled(
    debtor: impl Display,
    creditor: impl Display,
    amount: impl Display,
    date: impl Display,
    status: impl Display,
) -> String {
    format!("{debtor} paid {creditor} {amount} on {date} ({status})")
}

pub fn unknown_participant(id: impl Display) -> String {
    format!("{id} is not a participant of this diary")
}

pub struct SkippedRecordsMessage {
    expenses: usize,
    settlements: usize,
}

pub struct ImbalanceMessage<R> {
    residual: R,
}

pub fn skipped_records(expenses: usize, settlements: usize) -> SkippedRecordsMessage {
    SkippedRecordsMessage {
        expenses,
        settlements,
    }
}

pub fn imbalance<R: Display>(residual: R) -> ImbalanceMessage<R> {
    ImbalanceMessage { residual }
}

impl Display for SkippedRecordsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Left out {} malformed expense(s) and {} malformed settlement(s).",
            self.expenses, self.settlements
        )
    }
}

impl<R: Display> Display for ImbalanceMessage<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balances are off by {}. The diary data may be inconsistent.",
            self.residual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_total_marks_complete_and_incomplete() {
        assert_eq!(split_total(100), "✓ Total: 100%");
        assert_eq!(split_total(95), "⚠ Total: 95%, must be 100%");
    }

    #[test]
    fn expense_lines_render() {
        assert_eq!(event_heading("Day 1", 2), "Day 1 (2)");
        assert_eq!(your_balance("-₹30.00"), "Your balance: -₹30.00");
        assert_eq!(
            settled("Ben", "Asha", "₹10.00", "2024-03-03 08:00", STATUS_CONFIRMED),
            "Ben paid Asha ₹10.00 on 2024-03-03 08:00 (confirmed)"
        );
    }

    #[test]
    fn payment_count_pluralizes() {
        assert_eq!(payment_count(1, "₹5.00"), "1 payment, ₹5.00");
        assert_eq!(payment_count(3, "₹5.00"), "3 payments, ₹5.00");
    }

    #[test]
    fn messages_render() {
        assert_eq!(
            skipped_records(2, 0).to_string(),
            "Left out 2 malformed expense(s) and 0 malformed settlement(s)."
        );
        assert!(imbalance("0.50").to_string().starts_with("Balances are off by 0.50"));
    }
}
