use indexmap::IndexMap;
use splitdiary_domain::{
    DEFAULT_EVENT_ID, DEFAULT_EVENT_NAME, Expense, Money, ParticipantId, ParticipantList,
    PendingConfirmation, SettlementInstruction, SettlementRecord,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiaryId(String);

impl DiaryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryPerson {
    pub name: String,
    pub user_id: Option<String>,
}

/// A named group of expenses inside a diary, such as one day of a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEvent {
    pub id: String,
    pub name: String,
    pub order: i64,
}

impl DiaryEvent {
    pub fn general() -> Self {
        Self {
            id: DEFAULT_EVENT_ID.to_owned(),
            name: DEFAULT_EVENT_NAME.to_owned(),
            order: 0,
        }
    }
}

/// The expenses filed under one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventExpenses<'a> {
    pub event_id: &'a str,
    pub name: &'a str,
    pub expenses: Vec<&'a Expense>,
}

/// Rows dropped while reading a stored diary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkippedRecords {
    pub expenses: usize,
    pub settlements: usize,
}

impl SkippedRecords {
    pub fn total(&self) -> usize {
        self.expenses + self.settlements
    }
}

/// One consistent read of a diary.
#[derive(Debug, Clone, PartialEq)]
pub struct DiarySnapshot {
    pub diary_id: DiaryId,
    pub name: String,
    pub participants: ParticipantList,
    pub people: IndexMap<ParticipantId, DiaryPerson>,
    /// Display order.
    pub events: Vec<DiaryEvent>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<SettlementRecord>,
    pub skipped: SkippedRecords,
}

impl DiarySnapshot {
    /// Non-empty events in display order. Expenses that name an event the
    /// diary no longer lists fall under the default event.
    pub fn expenses_by_event(&self) -> Vec<EventExpenses<'_>> {
        let mut groups: IndexMap<&str, EventExpenses<'_>> = self
            .events
            .iter()
            .map(|event| {
                (
                    event.id.as_str(),
                    EventExpenses {
                        event_id: &event.id,
                        name: &event.name,
                        expenses: Vec::new(),
                    },
                )
            })
            .collect();
        if !groups.contains_key(DEFAULT_EVENT_ID) {
            groups.insert(
                DEFAULT_EVENT_ID,
                EventExpenses {
                    event_id: DEFAULT_EVENT_ID,
                    name: DEFAULT_EVENT_NAME,
                    expenses: Vec::new(),
                },
            );
        }

        for expense in &self.expenses {
            let key = if groups.contains_key(expense.event_id()) {
                expense.event_id()
            } else {
                DEFAULT_EVENT_ID
            };
            if let Some(group) = groups.get_mut(key) {
                group.expenses.push(expense);
            }
        }

        groups
            .into_values()
            .filter(|group| !group.expenses.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantBalance {
    pub id: ParticipantId,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub balances: Vec<ParticipantBalance>,
    pub instructions: Vec<SettlementInstruction>,
    pub residual: Money,
    pub conserved: bool,
    pub pending_confirmations: Vec<PendingConfirmation>,
}

impl LedgerSummary {
    pub fn balance_of(&self, id: &ParticipantId) -> Money {
        self.balances
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| entry.balance)
            .unwrap_or_default()
    }

    pub fn is_settled(&self) -> bool {
        self.instructions.is_empty() && self.pending_confirmations.is_empty()
    }
}

/// What one participant has to receive and pay across a diary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticipantPosition {
    pub balance: Money,
    pub to_receive_count: usize,
    pub to_receive_total: Money,
    pub to_pay_count: usize,
    pub to_pay_total: Money,
    /// Marked as paid by this participant, still waiting on the creditor.
    pub awaiting_confirmation: Money,
}

/// Reasons a participant cannot leave a diary yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeaveCheck {
    pub has_expenses: bool,
    pub has_settlements: bool,
    pub pending_instructions: Vec<SettlementInstruction>,
}

impl LeaveCheck {
    pub fn can_leave(&self) -> bool {
        !self.has_expenses && !self.has_settlements && self.pending_instructions.is_empty()
    }
}
