use crate::diary_document::parse_diary_document;
use splitdiary_application::{DiaryId, DiaryLoadError, DiaryRepository, DiarySnapshot};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Diaries stored as `<root>/<diary id>.json`.
pub struct JsonDiaryRepository {
    root: PathBuf,
}

impl JsonDiaryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, diary_id: &DiaryId) -> PathBuf {
        self.root.join(format!("{diary_id}.json"))
    }
}

impl DiaryRepository for JsonDiaryRepository {
    fn load(&self, diary_id: &DiaryId) -> Result<DiarySnapshot, DiaryLoadError> {
        let path = self.path_for(diary_id);
        let raw = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DiaryLoadError::NotFound(diary_id.to_string()),
            _ => DiaryLoadError::Unreadable {
                diary_id: diary_id.to_string(),
                reason: err.to_string(),
            },
        })?;

        let mut snapshot = parse_diary_document(&raw)?;
        if snapshot.diary_id.as_str().is_empty() {
            snapshot.diary_id = diary_id.clone();
        }
        tracing::debug!(path = %path.display(), "diary document read");
        Ok(snapshot)
    }
}
