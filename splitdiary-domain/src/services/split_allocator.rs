//! Percentage allocation for an expense's participants.
//!
//! Every split is a whole percentage. Remainders from integer division always
//! land on the first eligible participant in list order, which makes results
//! reproducible as long as callers keep the participant order stable.

use crate::model::{
    FULL_SHARE, FrozenSet, ParticipantId, ParticipantList, Percent, SplitMap, SplitTotalMismatch,
};
use thiserror::Error;

/// Smallest share either side of a drag may be pushed to.
pub const MIN_DRAG_SHARE: Percent = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitAllocationError {
    #[error("cannot split an expense between zero participants")]
    NoParticipants,
}

/// Outcome of redistributing the rest of the 100% after an explicit edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redistribution {
    /// The map adds up to exactly 100 again.
    Absorbed,
    /// Nobody was left to absorb `remaining`, or it was negative. The map is
    /// left as-is and will fail [`SplitState::validate`].
    Unabsorbed { remaining: i64 },
    /// The target was frozen or not a participant; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitEdit {
    pub state: SplitState,
    pub redistribution: Redistribution,
}

/// `floor(100 / n)` for everyone, with the remainder added to the first
/// participant.
pub fn equal_split(participants: &ParticipantList) -> Result<SplitMap, SplitAllocationError> {
    if participants.is_empty() {
        return Err(SplitAllocationError::NoParticipants);
    }

    let ids: Vec<&ParticipantId> = participants.iter().collect();
    let mut splits = SplitMap::with_capacity(ids.len());
    spread(&mut splits, FULL_SHARE, &ids);
    Ok(splits)
}

pub fn split_total(splits: &SplitMap, participants: &ParticipantList) -> Percent {
    participants
        .iter()
        .map(|id| splits.get(id).copied().unwrap_or(0))
        .fold(0, Percent::saturating_add)
}

/// The gate every expense passes before it is stored.
pub fn validate_splits(splits: &SplitMap, participants: &ParticipantList) -> bool {
    split_total(splits, participants) == FULL_SHARE
}

fn spread(splits: &mut SplitMap, total: Percent, ids: &[&ParticipantId]) {
    let Ok(count) = Percent::try_from(ids.len()) else {
        return;
    };
    if count == 0 {
        return;
    }

    let base = total / count;
    let remainder = total - base * count;
    for (idx, id) in ids.iter().enumerate() {
        let share = if idx == 0 { base + remainder } else { base };
        splits.insert((*id).clone(), share);
    }
}

/// Splits being edited for one expense.
///
/// Operations never mutate; each returns the next state so an editor can keep
/// history for undo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitState {
    participants: ParticipantList,
    splits: SplitMap,
    frozen: FrozenSet,
}

impl SplitState {
    /// Equal split with nothing frozen. An empty list gives an empty map,
    /// which the validation gate then rejects.
    pub fn equal(participants: ParticipantList) -> Self {
        let splits = equal_split(&participants).unwrap_or_default();
        Self {
            participants,
            splits,
            frozen: FrozenSet::default(),
        }
    }

    /// Rebuilds editor state from a stored expense.
    pub fn from_parts(participants: ParticipantList, splits: SplitMap, mut frozen: FrozenSet) -> Self {
        frozen.retain(|id| participants.contains(id));
        Self {
            participants,
            splits,
            frozen,
        }
    }

    pub fn participants(&self) -> &ParticipantList {
        &self.participants
    }

    pub fn splits(&self) -> &SplitMap {
        &self.splits
    }

    pub fn frozen(&self) -> &FrozenSet {
        &self.frozen
    }

    pub fn split_of(&self, id: &ParticipantId) -> Percent {
        self.splits.get(id).copied().unwrap_or(0)
    }

    pub fn is_frozen(&self, id: &ParticipantId) -> bool {
        self.frozen.contains(id)
    }

    pub fn total(&self) -> Percent {
        split_total(&self.splits, &self.participants)
    }

    pub fn validate(&self) -> Result<(), SplitTotalMismatch> {
        let actual = self.total();
        if actual == FULL_SHARE {
            Ok(())
        } else {
            Err(SplitTotalMismatch { actual })
        }
    }

    pub fn reset_equal(&self) -> Self {
        Self::equal(self.participants.clone())
    }

    /// Adds or removes `id`, then re-splits equally and clears every freeze.
    pub fn toggle_participant(&self, id: &ParticipantId) -> Self {
        let participants = if self.participants.contains(id) {
            self.participants.without(id)
        } else {
            self.participants.with(id.clone())
        };
        tracing::debug!(
            participant = %id,
            participant_count = participants.len(),
            "participant toggled; splits reset to equal"
        );
        Self::equal(participants)
    }

    /// Flips the freeze on `id`. Splits are not recomputed. Ids outside the
    /// participant list are ignored.
    pub fn toggle_freeze(&self, id: &ParticipantId) -> Self {
        if !self.participants.contains(id) {
            return self.clone();
        }
        let mut frozen = self.frozen.clone();
        if !frozen.shift_remove(id) {
            frozen.insert(id.clone());
        }
        Self {
            frozen,
            ..self.clone()
        }
    }

    /// Pins `id` to `value` and spreads what is left of 100 over everyone who
    /// is neither frozen nor `id`.
    pub fn set_explicit_split(&self, id: &ParticipantId, value: Percent) -> SplitEdit {
        if !self.participants.contains(id) || self.frozen.contains(id) {
            return SplitEdit {
                state: self.clone(),
                redistribution: Redistribution::Ignored,
            };
        }

        let mut splits = self.splits.clone();
        splits.insert(id.clone(), value.min(FULL_SHARE));

        let pinned_total: i64 = self
            .participants
            .iter()
            .filter(|p| self.frozen.contains(*p) || *p == id)
            .map(|p| i64::from(splits.get(p).copied().unwrap_or(0)))
            .sum();
        let remaining = i64::from(FULL_SHARE) - pinned_total;
        let others: Vec<&ParticipantId> = self
            .participants
            .iter()
            .filter(|p| !self.frozen.contains(*p) && *p != id)
            .collect();

        let redistribution = match Percent::try_from(remaining) {
            Ok(absorbable) if !others.is_empty() => {
                spread(&mut splits, absorbable, &others);
                Redistribution::Absorbed
            }
            Ok(0) => Redistribution::Absorbed,
            _ => Redistribution::Unabsorbed { remaining },
        };

        if let Redistribution::Unabsorbed { remaining } = redistribution {
            tracing::debug!(
                participant = %id,
                remaining,
                unfrozen_others = others.len(),
                "explicit split left a remainder nobody can absorb"
            );
        }

        SplitEdit {
            state: Self {
                splits,
                ..self.clone()
            },
            redistribution,
        }
    }

    /// Moves share between `left` and `right` only. Their combined share is
    /// conserved and neither side drops below [`MIN_DRAG_SHARE`].
    ///
    /// Returns the state unchanged when either side is frozen or missing, when
    /// all but one participant are frozen, or when the pair holds less than
    /// twice the minimum.
    pub fn drag_adjust(&self, left: &ParticipantId, right: &ParticipantId, desired_left: f64) -> Self {
        if left == right
            || !self.participants.contains(left)
            || !self.participants.contains(right)
            || self.frozen.contains(left)
            || self.frozen.contains(right)
            || self.frozen.len() + 1 >= self.participants.len()
            || !desired_left.is_finite()
        {
            return self.clone();
        }

        let total = self.split_of(left) + self.split_of(right);
        if total < MIN_DRAG_SHARE * 2 {
            return self.clone();
        }

        let (new_left, new_right) = rebalance_pair(total, desired_left);
        let mut splits = self.splits.clone();
        splits.insert(left.clone(), new_left);
        splits.insert(right.clone(), new_right);

        Self {
            splits,
            ..self.clone()
        }
    }

    /// Drags the divider between participants `index` and `index + 1`.
    pub fn drag_divider(&self, index: usize, desired_left: f64) -> Self {
        match (self.participants.get(index), self.participants.get(index + 1)) {
            (Some(left), Some(right)) => self.drag_adjust(left, right, desired_left),
            _ => self.clone(),
        }
    }
}

fn rebalance_pair(total: Percent, desired_left: f64) -> (Percent, Percent) {
    let total_f = f64::from(total);
    let floor = f64::from(MIN_DRAG_SHARE);
    let clamped = desired_left.clamp(floor, total_f - floor);

    let mut left = clamped.round() as i64;
    let mut right = (total_f - clamped).round() as i64;

    // Both halves can round up on an exact .5; give the difference back to
    // the larger side.
    let drift = i64::from(total) - (left + right);
    if drift != 0 {
        if left > right {
            left += drift;
        } else {
            right += drift;
        }
    }

    (left as Percent, right as Percent)
}
