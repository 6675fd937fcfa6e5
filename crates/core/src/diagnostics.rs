//! Post-mortem snapshots for missing package fragments.
//!
//! A report is plain data. Rendering it (text, JSON, a log line) is left to
//! whoever receives it.

use crate::cache::PackageExistenceCache;
use crate::provider::EagerSourceSet;
use declscope_api::{ModificationTracker, ModuleId, QualifiedName, ScopeToken, SourceUnit};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    /// Taken when the factory was built.
    Creation,
    /// Taken when resolution came back empty-handed.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnitSnapshot {
    pub display_name: String,
    pub is_physical: bool,
    pub modification_stamp: u64,
    pub package: QualifiedName,
}

impl From<&SourceUnit> for SourceUnitSnapshot {
    fn from(unit: &SourceUnit) -> Self {
        Self {
            display_name: unit.display_name.clone(),
            is_physical: unit.is_physical,
            modification_stamp: unit.modification_stamp,
            package: unit.package.clone(),
        }
    }
}

/// Existence answer recomputed from the index, bypassing the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ExistenceProbe {
    Exists(bool),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub phase: ReportPhase,
    pub module: ModuleId,
    pub failing_package: Option<QualifiedName>,
    /// Eager units in collection order.
    pub source_units: Vec<SourceUnitSnapshot>,
    pub package_in_source_units: Option<bool>,
    /// Answer of the cached entry as it stood, stale or not.
    pub cached_existence: Option<bool>,
    pub fresh_existence: Option<ExistenceProbe>,
    pub tracker_value: u64,
    pub cached_tag: Option<u64>,
    pub scope: ScopeToken,
}

impl DiagnosticReport {
    /// The cached entry disagrees with a fresh scan.
    pub fn is_stale_cache(&self) -> bool {
        matches!(
            (self.cached_existence, &self.fresh_existence),
            (Some(cached), Some(ExistenceProbe::Exists(fresh))) if cached != *fresh
        )
    }
}

/// Assembles reports for one factory. Never mutates the cache.
#[derive(Clone)]
pub struct DiagnosticReporter {
    module: ModuleId,
    sources: EagerSourceSet,
    existence: Arc<PackageExistenceCache>,
    trackers: Arc<dyn ModificationTracker>,
    scope: ScopeToken,
}

impl DiagnosticReporter {
    pub fn new(
        module: ModuleId,
        sources: EagerSourceSet,
        existence: Arc<PackageExistenceCache>,
        trackers: Arc<dyn ModificationTracker>,
        scope: ScopeToken,
    ) -> Self {
        Self {
            module,
            sources,
            existence,
            trackers,
            scope,
        }
    }

    pub fn snapshot_on_creation(&self) -> DiagnosticReport {
        DiagnosticReport {
            phase: ReportPhase::Creation,
            module: self.module,
            failing_package: None,
            source_units: self.unit_snapshots(),
            package_in_source_units: None,
            cached_existence: None,
            fresh_existence: None,
            tracker_value: self.trackers.modification_count(self.module),
            cached_tag: self.existence.cached_tag(self.module),
            scope: self.scope,
        }
    }

    pub fn report(&self, failing_package: &QualifiedName) -> DiagnosticReport {
        let cached = self.existence.peek(self.module);
        let fresh = match self.existence.exists_fresh(self.module, failing_package) {
            Ok(exists) => ExistenceProbe::Exists(exists),
            Err(err) => ExistenceProbe::Unavailable(err.to_string()),
        };

        DiagnosticReport {
            phase: ReportPhase::Failure,
            module: self.module,
            failing_package: Some(failing_package.clone()),
            source_units: self.unit_snapshots(),
            package_in_source_units: Some(self.sources.contains_package(failing_package)),
            cached_existence: cached.as_ref().map(|set| set.contains(failing_package)),
            fresh_existence: Some(fresh),
            tracker_value: self.trackers.modification_count(self.module),
            cached_tag: cached.map(|set| set.tag()),
            scope: self.scope,
        }
    }

    fn unit_snapshots(&self) -> Vec<SourceUnitSnapshot> {
        self.sources.units().iter().map(SourceUnitSnapshot::from).collect()
    }
}
