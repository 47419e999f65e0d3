use crate::state::store::ValueStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A value map captured at submit time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub values: ValueStore,
    pub submitted_at: DateTime<Utc>,
}

/// Append-only, in-memory log of submissions for the current session.
#[derive(Debug, Default)]
pub struct SubmissionLog {
    entries: Vec<Submission>,
}

impl SubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, values: ValueStore) -> &Submission {
        self.entries.push(Submission {
            values,
            submitted_at: Utc::now(),
        });
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub fn entries(&self) -> &[Submission] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
