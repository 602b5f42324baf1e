use crate::{error::DiaryLoadError, model::DiaryId, model::DiarySnapshot};
use indexmap::IndexMap;
use splitdiary_domain::{ParticipantBalances, ParticipantId, SettlementInstruction};
use std::collections::HashMap;

pub trait DiaryRepository: Send + Sync {
    fn load(&self, diary_id: &DiaryId) -> Result<DiarySnapshot, DiaryLoadError>;
}

pub trait SettlementOptimizer: Send + Sync {
    fn optimize(&self, balances: &ParticipantBalances) -> Vec<SettlementInstruction>;
}

pub trait ParticipantDirectory: Send + Sync {
    fn display_name(&self, participant_id: &ParticipantId) -> Option<&str>;
}

impl ParticipantDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, participant_id: &ParticipantId) -> Option<&str> {
        self.get(participant_id).map(String::as_str)
    }
}

impl ParticipantDirectory for IndexMap<ParticipantId, String> {
    fn display_name(&self, participant_id: &ParticipantId) -> Option<&str> {
        self.get(participant_id).map(String::as_str)
    }
}

impl ParticipantDirectory for DiarySnapshot {
    fn display_name(&self, participant_id: &ParticipantId) -> Option<&str> {
        self.people
            .get(participant_id)
            .map(|person| person.name.as_str())
    }
}
