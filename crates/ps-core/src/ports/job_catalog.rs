use crate::ids::ClassJobId;

/// Abbreviation shown when a job id cannot be resolved.
pub const UNKNOWN_JOB: &str = "?";

/// Lookup of class/job abbreviations ("PLD", "WHM", ...) from the host's data sheets.
pub trait JobCatalogPort: Send + Sync {
    /// `Ok(None)` when the id has no row.
    fn abbreviation(&self, job: ClassJobId) -> anyhow::Result<Option<String>>;

    /// Like [`JobCatalogPort::abbreviation`], falling back to [`UNKNOWN_JOB`].
    fn abbreviation_or_unknown(&self, job: ClassJobId) -> String {
        match self.abbreviation(job) {
            Ok(Some(abbr)) if !abbr.is_empty() => abbr,
            _ => UNKNOWN_JOB.to_string(),
        }
    }
}

#[cfg(test)]
mockall::mock! {
    pub JobCatalog {}

    impl JobCatalogPort for JobCatalog {
        fn abbreviation(&self, job: ClassJobId) -> anyhow::Result<Option<String>>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviation_or_unknown_falls_back() {
        let mut catalog = MockJobCatalog::new();
        catalog.expect_abbreviation().returning(|job| match job.get() {
            19 => Ok(Some("PLD".to_string())),
            20 => Ok(Some(String::new())),
            21 => Err(anyhow::anyhow!("sheet not loaded")),
            _ => Ok(None),
        });

        assert_eq!(catalog.abbreviation_or_unknown(ClassJobId::new(19)), "PLD");
        assert_eq!(catalog.abbreviation_or_unknown(ClassJobId::new(20)), UNKNOWN_JOB);
        assert_eq!(catalog.abbreviation_or_unknown(ClassJobId::new(21)), UNKNOWN_JOB);
        assert_eq!(catalog.abbreviation_or_unknown(ClassJobId::new(99)), UNKNOWN_JOB);
    }
}
