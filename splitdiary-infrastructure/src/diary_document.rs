//! Stored diary documents.
//!
//! Documents are written by other clients and may be partial or legacy, so
//! each expense and settlement is converted on its own. A bad row is logged
//! and counted in [`SkippedRecords`], never fatal.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use splitdiary_application::{
    DiaryEvent, DiaryId, DiaryLoadError, DiaryPerson, DiarySnapshot, SkippedRecords,
};
use splitdiary_domain::{
    DEFAULT_EVENT_ID, Expense, ExpenseDraft, ExpenseValidationError, MAX_AMOUNT, Money,
    ParticipantId, ParticipantList, Percent, SettlementRecord, SettlementStatus, SplitMap,
    SplitMode,
};
use std::str::FromStr;
use thiserror::Error;

/// Top-level shape of a stored diary. Rows stay raw JSON until each one is
/// converted on its own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub people: IndexMap<String, PersonDocument>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub expenses: Vec<serde_json::Value>,
    #[serde(default)]
    pub settlements: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Option<AmountDocument>,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub splits: IndexMap<String, PercentDocument>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub split_mode: SplitModeDocument,
    #[serde(default)]
    pub frozen_splits: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitModeDocument {
    #[default]
    Equal,
    Percentage,
    Custom,
}

impl From<SplitModeDocument> for SplitMode {
    fn from(mode: SplitModeDocument) -> Self {
        match mode {
            SplitModeDocument::Equal => SplitMode::Equal,
            SplitModeDocument::Percentage | SplitModeDocument::Custom => SplitMode::Custom,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountDocument>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: StatusDocument,
    #[serde(default)]
    pub marked_paid_by: Option<String>,
    #[serde(default)]
    pub marked_paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDocument {
    #[default]
    Pending,
    MarkedPaid,
    Confirmed,
}

impl From<StatusDocument> for SettlementStatus {
    fn from(status: StatusDocument) -> Self {
        match status {
            StatusDocument::Pending => SettlementStatus::Pending,
            StatusDocument::MarkedPaid => SettlementStatus::MarkedPaid,
            StatusDocument::Confirmed => SettlementStatus::Confirmed,
        }
    }
}

/// Amounts arrive as JSON numbers from most clients and as strings from a few.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountDocument {
    Number(serde_json::Number),
    Text(String),
}

impl AmountDocument {
    /// Goes through the shortest decimal rendering, so `29.7` stays `29.7`
    /// instead of picking up binary float noise.
    fn to_money(&self) -> Result<Money, RecordIssue> {
        let text = match self {
            AmountDocument::Number(number) => number.to_string(),
            AmountDocument::Text(text) => text.trim().to_owned(),
        };
        let amount = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Money::from_decimal)
            .map_err(|_| RecordIssue::InvalidAmount(text.clone()))?;
        if amount.abs() > MAX_AMOUNT {
            return Err(RecordIssue::AmountOutOfRange(text));
        }
        Ok(amount)
    }
}

/// Split values, stored as numbers or as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PercentDocument {
    Number(serde_json::Number),
    Text(String),
}

impl PercentDocument {
    /// Whole, non-negative percentages only. `50.0` counts as whole.
    fn to_percent(&self) -> Option<Percent> {
        match self {
            PercentDocument::Number(number) => number
                .as_u64()
                .and_then(|value| Percent::try_from(value).ok())
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|value| value.fract() == 0.0 && (0.0..=100.0).contains(value))
                        .map(|value| value as Percent)
                }),
            PercentDocument::Text(text) => text.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            PercentDocument::Number(number) => number.to_string(),
            PercentDocument::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Error)]
enum RecordIssue {
    #[error("unreadable row: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("amount {0:?} is not a number")]
    InvalidAmount(String),
    #[error("amount {0} is outside the supported range")]
    AmountOutOfRange(String),
    #[error("split {value:?} for {participant} is not a whole percentage")]
    InvalidSplit { participant: String, value: String },
    #[error(transparent)]
    Invalid(#[from] ExpenseValidationError),
}

pub fn parse_diary_document(raw: &str) -> Result<DiarySnapshot, DiaryLoadError> {
    let document: DiaryDocument =
        serde_json::from_str(raw).map_err(|err| DiaryLoadError::Malformed(err.to_string()))?;
    Ok(document.into_snapshot())
}

/// Converts every row independently; rows that fail are logged and counted.
fn convert_rows<D, T>(
    diary_id: &str,
    kind: &'static str,
    rows: Vec<serde_json::Value>,
    convert: impl Fn(D) -> Result<T, RecordIssue>,
) -> (Vec<T>, usize)
where
    D: DeserializeOwned,
{
    let mut converted = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in rows {
        let row_id = row
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        match serde_json::from_value::<D>(row)
            .map_err(RecordIssue::from)
            .and_then(&convert)
        {
            Ok(record) => converted.push(record),
            Err(issue) => {
                tracing::warn!(
                    diary_id,
                    record = kind,
                    record_id = %row_id,
                    reason = %issue,
                    "skipping record"
                );
                skipped += 1;
            }
        }
    }
    (converted, skipped)
}

impl DiaryDocument {
    pub fn into_snapshot(self) -> DiarySnapshot {
        let participants: ParticipantList = self
            .people
            .keys()
            .map(|id| ParticipantId::new(id.as_str()))
            .collect();
        let people = self
            .people
            .into_iter()
            .map(|(id, person)| {
                (
                    ParticipantId::new(id),
                    DiaryPerson {
                        name: person.name,
                        user_id: person.user_id,
                    },
                )
            })
            .collect();

        let (events, _) = convert_rows(&self.id, "event", self.events, EventDocument::into_event);
        let events = ordered_events(events);
        let (expenses, skipped_expenses) =
            convert_rows(&self.id, "expense", self.expenses, ExpenseDocument::into_expense);
        let (settlements, skipped_settlements) = convert_rows(
            &self.id,
            "settlement",
            self.settlements,
            SettlementDocument::into_record,
        );

        tracing::debug!(
            diary_id = %self.id,
            participant_count = participants.len(),
            event_count = events.len(),
            expense_count = expenses.len(),
            settlement_count = settlements.len(),
            "diary document converted"
        );

        DiarySnapshot {
            diary_id: DiaryId::new(self.id),
            name: self.name,
            participants,
            people,
            events,
            expenses,
            settlements,
            skipped: SkippedRecords {
                expenses: skipped_expenses,
                settlements: skipped_settlements,
            },
        }
    }
}

/// Sorted by `order`, keeping document order on ties, with the default event
/// added in front when the document lacks it.
fn ordered_events(mut events: Vec<DiaryEvent>) -> Vec<DiaryEvent> {
    events.sort_by_key(|event| event.order);
    if !events.iter().any(|event| event.id == DEFAULT_EVENT_ID) {
        events.insert(0, DiaryEvent::general());
    }
    events
}

impl EventDocument {
    fn into_event(self) -> Result<DiaryEvent, RecordIssue> {
        if self.id.trim().is_empty() {
            return Err(RecordIssue::MissingField("id"));
        }
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name
        };
        Ok(DiaryEvent {
            id: self.id,
            name,
            order: self.order,
        })
    }
}

impl ExpenseDocument {
    fn into_expense(self) -> Result<Expense, RecordIssue> {
        let paid_by = self.paid_by.ok_or(RecordIssue::MissingField("paidBy"))?;
        let participants = self
            .participants
            .ok_or(RecordIssue::MissingField("participants"))?;
        let amount = self
            .amount
            .ok_or(RecordIssue::MissingField("amount"))?
            .to_money()?;

        let mut splits = SplitMap::with_capacity(participants.len());
        for (id, value) in self.splits {
            if !participants.contains(&id) {
                continue;
            }
            let percent = value.to_percent().ok_or_else(|| RecordIssue::InvalidSplit {
                participant: id.clone(),
                value: value.raw(),
            })?;
            splits.insert(ParticipantId::new(id), percent);
        }

        let expense = Expense::try_new(ExpenseDraft {
            id: self.id,
            description: self.description,
            amount,
            paid_by: ParticipantId::new(paid_by),
            participants: participants.into_iter().map(ParticipantId::new).collect(),
            splits,
            date: self.date.unwrap_or_default(),
            event_id: self.event_id,
            split_mode: self.split_mode.into(),
            frozen_splits: self.frozen_splits.into_iter().map(ParticipantId::new).collect(),
        })?;
        Ok(expense)
    }
}

impl SettlementDocument {
    fn into_record(self) -> Result<SettlementRecord, RecordIssue> {
        let from = self.from.ok_or(RecordIssue::MissingField("from"))?;
        let to = self.to.ok_or(RecordIssue::MissingField("to"))?;
        let amount = self
            .amount
            .ok_or(RecordIssue::MissingField("amount"))?
            .to_money()?;

        Ok(SettlementRecord {
            id: self.id,
            from: ParticipantId::new(from),
            to: ParticipantId::new(to),
            amount,
            date: self.date.unwrap_or_default(),
            status: self.status.into(),
            marked_paid_by: self.marked_paid_by,
            marked_paid_at: self.marked_paid_at,
        })
    }
}
