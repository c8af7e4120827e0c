use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use ps_core::ports::JobCatalogPort;
use ps_core::ClassJobId;
use tracing::debug;

/// Memoizes abbreviations resolved by the host's job sheet.
///
/// Only successful, non-empty lookups are cached, so a sheet that was not
/// loaded yet is asked again next time.
pub struct CachingJobCatalog {
    inner: Arc<dyn JobCatalogPort>,
    cache: RwLock<HashMap<ClassJobId, String>>,
}

impl CachingJobCatalog {
    pub fn new(inner: Arc<dyn JobCatalogPort>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl JobCatalogPort for CachingJobCatalog {
    fn abbreviation(&self, job: ClassJobId) -> anyhow::Result<Option<String>> {
        if let Some(hit) = self.cache.read().get(&job) {
            return Ok(Some(hit.clone()));
        }

        let found = self.inner.abbreviation(job)?;
        match &found {
            Some(abbr) if !abbr.is_empty() => {
                self.cache.write().insert(job, abbr.clone());
            }
            _ => debug!(job = %job, "No abbreviation for class/job"),
        }
        Ok(found)
    }
}
