mod caching_catalog;

pub use caching_catalog::CachingJobCatalog;
