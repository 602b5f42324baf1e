use std::{
    borrow::Borrow,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use indexmap::{IndexMap, IndexSet};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Whole-number share of an expense, 0..=100.
pub type Percent = u32;

/// The amount every complete split map adds up to.
pub const FULL_SHARE: Percent = 100;

/// Balances inside this band around zero count as settled.
pub const SETTLEMENT_TOLERANCE: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

/// Largest amount a single expense or settlement may carry (10^15).
///
/// Percent shares and running balances are computed with plain `Decimal`
/// arithmetic, which overflows near 7.9e28.
pub const MAX_AMOUNT: Money = Money(Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0));

/// Decimal places used when amounts are shown to people.
pub const DISPLAY_SCALE: u32 = 2;

/// Event an expense belongs to when it names none.
pub const DEFAULT_EVENT_ID: &str = "general";
pub const DEFAULT_EVENT_NAME: &str = "General Expenses";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn signum(self) -> i32 {
        if self.0.is_zero() {
            0
        } else if self.0.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// `percent`% of this amount, unrounded.
    pub fn percent(self, percent: Percent) -> Self {
        Self(self.0 * Decimal::from(percent) / Decimal::ONE_HUNDRED)
    }

    /// Half-away-from-zero rounding. Only presentation code should call this;
    /// running balances stay unrounded.
    pub fn round_for_display(self, scale: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// People in a diary, in the order they were added.
///
/// Order decides who receives the rounding remainder of an equal split, so it
/// is kept explicitly instead of relying on map iteration order.
#[derive(Clone, Debug, Default)]
pub struct ParticipantList {
    ids: IndexSet<ParticipantId>,
}

impl ParticipantList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        ParticipantId: Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.ids.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ParticipantId> {
        self.ids.get_index(index)
    }

    pub fn position<Q>(&self, id: &Q) -> Option<usize>
    where
        ParticipantId: Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.ids.get_index_of(id)
    }

    /// Appends `id` unless it is already present.
    pub fn with(&self, id: ParticipantId) -> Self {
        let mut ids = self.ids.clone();
        ids.insert(id);
        Self { ids }
    }

    /// Removes `id`, keeping everyone else in place.
    pub fn without(&self, id: &ParticipantId) -> Self {
        let mut ids = self.ids.clone();
        ids.shift_remove(id);
        Self { ids }
    }
}

impl PartialEq for ParticipantList {
    fn eq(&self, other: &Self) -> bool {
        self.ids.iter().eq(other.ids.iter())
    }
}

impl Eq for ParticipantList {}

impl FromIterator<ParticipantId> for ParticipantList {
    fn from_iter<T: IntoIterator<Item = ParticipantId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ParticipantList {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        iter.into_iter().map(ParticipantId::from).collect()
    }
}

impl<'a> IntoIterator for &'a ParticipantList {
    type Item = &'a ParticipantId;
    type IntoIter = indexmap::set::Iter<'a, ParticipantId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

pub type SplitMap = IndexMap<ParticipantId, Percent>;
pub type FrozenSet = IndexSet<ParticipantId>;
pub type ParticipantBalances = IndexMap<ParticipantId, Money>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitMode {
    #[default]
    Equal,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("split percentages must add up to 100 (current total: {actual}%)")]
pub struct SplitTotalMismatch {
    pub actual: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseValidationError {
    #[error("expense amount must not be negative (got {0})")]
    NegativeAmount(Money),
    #[error("expense amount {0} exceeds the largest supported amount")]
    AmountTooLarge(Money),
    #[error("expense description is empty")]
    EmptyDescription,
    #[error("expense has no participants")]
    NoParticipants,
    #[error("participant {0} is listed more than once")]
    DuplicateParticipant(ParticipantId),
    #[error("split entry for {0} does not belong to a participant")]
    SplitForNonParticipant(ParticipantId),
    #[error("split percentages must add up to 100 (current total: {actual}%)")]
    InvalidSplitTotal { actual: Percent },
}

impl From<SplitTotalMismatch> for ExpenseValidationError {
    fn from(err: SplitTotalMismatch) -> Self {
        ExpenseValidationError::InvalidSplitTotal { actual: err.actual }
    }
}

/// Unchecked expense input. The only way to get an [`Expense`] is through
/// [`Expense::try_new`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub id: String,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub participants: Vec<ParticipantId>,
    pub splits: SplitMap,
    pub date: DateTime<Utc>,
    pub event_id: Option<String>,
    pub split_mode: SplitMode,
    pub frozen_splits: Vec<ParticipantId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    id: String,
    description: String,
    amount: Money,
    paid_by: ParticipantId,
    participants: ParticipantList,
    splits: SplitMap,
    date: DateTime<Utc>,
    event_id: String,
    split_mode: SplitMode,
    frozen_splits: FrozenSet,
}

impl Expense {
    pub fn try_new(draft: ExpenseDraft) -> Result<Self, ExpenseValidationError> {
        let ExpenseDraft {
            id,
            description,
            amount,
            paid_by,
            participants,
            splits,
            date,
            event_id,
            split_mode,
            frozen_splits,
        } = draft;

        if amount.signum() < 0 {
            return Err(ExpenseValidationError::NegativeAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(ExpenseValidationError::AmountTooLarge(amount));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }
        if participants.is_empty() {
            return Err(ExpenseValidationError::NoParticipants);
        }

        let mut seen: FxHashSet<&ParticipantId> = FxHashSet::default();
        for participant in &participants {
            if !seen.insert(participant) {
                return Err(ExpenseValidationError::DuplicateParticipant(
                    participant.clone(),
                ));
            }
        }
        if let Some(stray) = splits.keys().find(|id| !seen.contains(id)) {
            return Err(ExpenseValidationError::SplitForNonParticipant(stray.clone()));
        }

        let participants: ParticipantList = participants.into_iter().collect();
        let actual = crate::services::split_total(&splits, &participants);
        if actual != FULL_SHARE {
            return Err(SplitTotalMismatch { actual }.into());
        }

        let frozen_splits = frozen_splits
            .into_iter()
            .filter(|id| participants.contains(id))
            .collect();

        Ok(Self {
            id,
            description: description.to_owned(),
            amount,
            paid_by,
            participants,
            splits,
            date,
            event_id: event_id
                .filter(|event_id| !event_id.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_ID.to_owned()),
            split_mode,
            frozen_splits,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn paid_by(&self) -> &ParticipantId {
        &self.paid_by
    }

    pub fn participants(&self) -> &ParticipantList {
        &self.participants
    }

    pub fn splits(&self) -> &SplitMap {
        &self.splits
    }

    pub fn split_of(&self, id: &ParticipantId) -> Percent {
        self.splits.get(id).copied().unwrap_or(0)
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn frozen_splits(&self) -> &FrozenSet {
        &self.frozen_splits
    }

    /// The part of the amount attributed to `id`. Zero for non-participants.
    pub fn share_of(&self, id: &ParticipantId) -> Money {
        if !self.participants.contains(id) {
            return Money::ZERO;
        }
        self.amount.percent(self.split_of(id))
    }

    /// How this one expense moves `id`'s balance.
    pub fn net_effect_for(&self, id: &ParticipantId) -> Money {
        let share = self.share_of(id);
        if &self.paid_by == id {
            self.amount - share
        } else {
            -share
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SettlementStatus {
    #[default]
    Pending,
    MarkedPaid,
    Confirmed,
}

impl SettlementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::MarkedPaid => "marked_paid",
            SettlementStatus::Confirmed => "confirmed",
        }
    }

    pub fn can_transition_to(self, next: SettlementStatus) -> bool {
        matches!(
            (self, next),
            (SettlementStatus::Pending, SettlementStatus::MarkedPaid)
                | (SettlementStatus::Pending, SettlementStatus::Confirmed)
                | (SettlementStatus::MarkedPaid, SettlementStatus::Confirmed)
        )
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment someone recorded. Counts toward balances whatever its status.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementRecord {
    pub id: String,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub status: SettlementStatus,
    pub marked_paid_by: Option<String>,
    pub marked_paid_at: Option<DateTime<Utc>>,
}

/// A computed "`from` should pay `to`" recommendation. Never stored as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementInstruction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn ids(raw: &[&str]) -> Vec<ParticipantId> {
        raw.iter().copied().map(ParticipantId::from).collect()
    }

    fn splits(raw: &[(&str, Percent)]) -> SplitMap {
        raw.iter()
            .map(|(id, percent)| (ParticipantId::from(*id), *percent))
            .collect()
    }

    #[fixture]
    fn draft() -> ExpenseDraft {
        ExpenseDraft {
            id: "e1".to_owned(),
            description: "  Dinner ".to_owned(),
            amount: Money::from_i64(90),
            paid_by: ParticipantId::from("A"),
            participants: ids(&["A", "B", "C"]),
            splits: splits(&[("A", 34), ("B", 33), ("C", 33)]),
            date: DateTime::<Utc>::UNIX_EPOCH,
            event_id: None,
            split_mode: SplitMode::Equal,
            frozen_splits: ids(&["B", "Z"]),
        }
    }

    #[rstest]
    fn valid_draft_becomes_expense(draft: ExpenseDraft) {
        let expense = Expense::try_new(draft).expect("valid draft");

        assert_eq!(expense.description(), "Dinner");
        assert_eq!(expense.event_id(), DEFAULT_EVENT_ID);
        assert_eq!(expense.frozen_splits().len(), 1);
        assert!(expense.frozen_splits().contains("B"));
        assert_eq!(expense.share_of(&"A".into()), Money::new(306, 1));
        assert_eq!(expense.net_effect_for(&"A".into()), Money::new(594, 1));
        assert_eq!(expense.net_effect_for(&"B".into()), Money::new(-297, 1));
        assert_eq!(expense.net_effect_for(&"Z".into()), Money::ZERO);
    }

    #[rstest]
    #[case::negative_amount(
        |d: &mut ExpenseDraft| d.amount = Money::from_i64(-1),
        ExpenseValidationError::NegativeAmount(Money::from_i64(-1))
    )]
    #[case::amount_too_large(
        |d: &mut ExpenseDraft| d.amount = Money::new(1, 0) + MAX_AMOUNT,
        ExpenseValidationError::AmountTooLarge(Money::new(1, 0) + MAX_AMOUNT)
    )]
    #[case::blank_description(
        |d: &mut ExpenseDraft| d.description = "   ".to_owned(),
        ExpenseValidationError::EmptyDescription
    )]
    #[case::no_participants(
        |d: &mut ExpenseDraft| {
            d.participants.clear();
            d.splits.clear();
        },
        ExpenseValidationError::NoParticipants
    )]
    #[case::duplicate_participant(
        |d: &mut ExpenseDraft| d.participants.push(ParticipantId::from("B")),
        ExpenseValidationError::DuplicateParticipant(ParticipantId::from("B"))
    )]
    #[case::stray_split(
        |d: &mut ExpenseDraft| {
            d.splits.insert(ParticipantId::from("Z"), 0);
        },
        ExpenseValidationError::SplitForNonParticipant(ParticipantId::from("Z"))
    )]
    #[case::split_total_off(
        |d: &mut ExpenseDraft| {
            d.splits.insert(ParticipantId::from("C"), 40);
        },
        ExpenseValidationError::InvalidSplitTotal { actual: 107 }
    )]
    #[case::missing_split_counts_as_zero(
        |d: &mut ExpenseDraft| {
            d.splits.shift_remove("C");
        },
        ExpenseValidationError::InvalidSplitTotal { actual: 67 }
    )]
    fn invalid_drafts_are_rejected(
        mut draft: ExpenseDraft,
        #[case] edit: fn(&mut ExpenseDraft),
        #[case] expected: ExpenseValidationError,
    ) {
        edit(&mut draft);
        assert_eq!(Expense::try_new(draft), Err(expected));
    }

    #[rstest]
    fn zero_amount_is_allowed(mut draft: ExpenseDraft) {
        draft.amount = Money::ZERO;
        assert!(Expense::try_new(draft).is_ok());
    }

    #[test]
    fn max_amount_is_ten_to_the_fifteenth() {
        assert_eq!(MAX_AMOUNT, Money::from_i64(1_000_000_000_000_000));
    }

    #[rstest]
    fn max_amount_itself_is_allowed(mut draft: ExpenseDraft) {
        draft.amount = MAX_AMOUNT;
        let expense = Expense::try_new(draft).expect("amount at the bound");
        assert_eq!(expense.share_of(&"A".into()), MAX_AMOUNT.percent(34));
    }

    #[test]
    fn participant_list_keeps_insertion_order() {
        let list: ParticipantList = ["C", "A", "B", "A"].into_iter().collect();
        let order: Vec<&str> = list.iter().map(ParticipantId::as_str).collect();
        assert_eq!(order, ["C", "A", "B"]);

        let without = list.without(&"A".into()).with("D".into());
        let order: Vec<&str> = without.iter().map(ParticipantId::as_str).collect();
        assert_eq!(order, ["C", "B", "D"]);
        assert_ne!(list, ParticipantList::from_iter(["A", "B", "C"]));
    }

    #[rstest]
    #[case::half_up(Money::new(29705, 3), Money::new(2971, 2))]
    #[case::half_away_negative(Money::new(-29705, 3), Money::new(-2971, 2))]
    #[case::already_rounded(Money::new(297, 1), Money::new(297, 1))]
    fn display_rounding(#[case] amount: Money, #[case] expected: Money) {
        assert_eq!(amount.round_for_display(DISPLAY_SCALE), expected);
    }

    #[rstest]
    #[case(SettlementStatus::Pending, SettlementStatus::MarkedPaid, true)]
    #[case(SettlementStatus::Pending, SettlementStatus::Confirmed, true)]
    #[case(SettlementStatus::MarkedPaid, SettlementStatus::Confirmed, true)]
    #[case(SettlementStatus::MarkedPaid, SettlementStatus::Pending, false)]
    #[case(SettlementStatus::Confirmed, SettlementStatus::MarkedPaid, false)]
    #[case(SettlementStatus::Confirmed, SettlementStatus::Confirmed, false)]
    fn status_transitions(
        #[case] from: SettlementStatus,
        #[case] to: SettlementStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }
}
