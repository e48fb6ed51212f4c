use chrono::NaiveDate;

use crate::{ImportError, ReadError};

#[allow(async_fn_in_trait)]
pub trait BackupService {
    async fn export_backup(&self) -> Result<String, ReadError>;
    async fn import_backup(&self, document: &str) -> Result<ImportSummary, ImportError>;
}

#[allow(async_fn_in_trait)]
pub trait BackupRepository {
    /// Serialize all collections into a backup document.
    async fn export_backup(&self) -> Result<String, ReadError>;
    /// Replace the stored collections by the content of a backup document.
    ///
    /// The document is validated completely before any collection is modified.
    async fn import_backup(&self, document: &str) -> Result<ImportSummary, ImportError>;
}

/// Number of imported records per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub exercises: usize,
    pub workout_templates: usize,
    pub completed_workouts: usize,
    /// `None` if the document contained no personal stats and the stored ones were kept.
    pub personal_stats: Option<usize>,
}

#[must_use]
pub fn backup_file_name(product: &str, date: NaiveDate) -> String {
    format!("{product}-backup-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_backup_file_name() {
        assert_eq!(
            backup_file_name("workout-tracker", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            "workout-tracker-backup-2024-03-05.json"
        );
    }
}
