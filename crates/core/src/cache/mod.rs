mod package_existence;

pub use package_existence::{CacheStats, PackageExistenceCache, PackageSet};
