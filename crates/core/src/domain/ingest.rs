use serde::Serialize;

/// Outcome of one file in a folder pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Success,
    Error,
    Skipped,
}

/// Per-file report
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub processed_at: String,
}

impl FileReport {
    pub fn success(
        file: String,
        output: String,
        moved_to: Option<String>,
        correlation_id: String,
    ) -> Self {
        Self {
            file,
            status: FileStatus::Success,
            output: Some(output),
            moved_to,
            reason: None,
            error: None,
            correlation_id: Some(correlation_id),
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(file: String, error: String, moved_to: Option<String>) -> Self {
        Self {
            file,
            status: FileStatus::Error,
            output: None,
            moved_to,
            reason: None,
            error: Some(error),
            correlation_id: None,
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn skipped(file: String, reason: String) -> Self {
        Self {
            file,
            status: FileStatus::Skipped,
            output: None,
            moved_to: None,
            reason: Some(reason),
            error: None,
            correlation_id: None,
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Tri-state summary of one folder pass
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<FileReport>,
}

impl BatchReport {
    pub fn from_results(results: Vec<FileReport>) -> Self {
        let count = |status: FileStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            processed: count(FileStatus::Success),
            failed: count(FileStatus::Error),
            skipped: count(FileStatus::Skipped),
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_counts() {
        let report = BatchReport::from_results(vec![
            FileReport::success("a.txt".into(), "out/a".into(), Some("in/processed/a.txt".into()), "c1".into()),
            FileReport::error("b.pdf".into(), "bad pdf".into(), None),
            FileReport::skipped("c.txt".into(), "too short".into()),
            FileReport::success("d.docx".into(), "out/d".into(), Some("in/processed/d.docx".into()), "c2".into()),
        ]);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let report = BatchReport::from_results(vec![]);
        assert_eq!(report.processed + report.failed + report.skipped, 0);
        assert!(report.is_empty());
    }
}
