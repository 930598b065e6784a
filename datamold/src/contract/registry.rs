//! Process-wide cache of materialization strategies.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use super::definition::{Contract, ContractDefinition};
use super::field::FieldDescriptor;
use super::plan::{ContractKey, ContractPlan};
use super::schema::{fingerprint, ContractSchema, DynamicObject};
use crate::errors::{BuilderError, Result};

/// Registered metadata for a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Contract name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// SHA-256 of the field list.
    pub fingerprint: String,
    /// When the strategy was built.
    pub registered_at: DateTime<Utc>,
}

impl ContractInfo {
    fn new(name: &str, fields: &[FieldDescriptor]) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.to_vec(),
            fingerprint: fingerprint(fields),
            registered_at: Utc::now(),
        }
    }
}

struct RegistryEntry {
    plan: Arc<dyn Any + Send + Sync>,
    info: ContractInfo,
}

type Slot = Arc<OnceCell<RegistryEntry>>;

/// Cache of contract plans, one per [`ContractKey`].
///
/// Each key is built at most once. The map shard is locked only long enough
/// to fetch or insert the key's cell; the build runs inside the cell, so
/// concurrent callers for the same key wait for a single build while other
/// keys stay available. A failed build leaves the cell empty and the next
/// caller retries.
#[derive(Default)]
pub struct ContractRegistry {
    entries: DashMap<ContractKey, Slot>,
    builds: AtomicUsize,
}

impl ContractRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan for `T`, building it on first use.
    pub fn get_or_create<T: Contract>(&self) -> Result<Arc<ContractPlan<T>>> {
        self.get_or_build(ContractKey::of::<T>(), ContractDefinition::<T>::plan_for)
    }

    /// Returns the cached plan for a runtime schema, building it on first use.
    ///
    /// A schema name already bound to a different field set is rejected.
    pub fn get_or_create_schema(
        &self,
        schema: &ContractSchema,
    ) -> Result<Arc<ContractPlan<DynamicObject>>> {
        let plan = self.get_or_build(ContractKey::schema(&schema.name), || schema.plan())?;
        if plan.fields() != schema.fields.as_slice() {
            return Err(BuilderError::invalid_contract(
                &schema.name,
                "already registered with a different field set",
            ));
        }
        Ok(plan)
    }

    /// Returns the plan for `T` only if it has already been built.
    pub fn lookup<T: Contract>(&self) -> Result<Option<Arc<ContractPlan<T>>>> {
        self.lookup_key(&ContractKey::of::<T>())
    }

    /// Returns the plan stored under `key` only if it has already been built.
    pub fn lookup_key<T: Send + Sync + 'static>(
        &self,
        key: &ContractKey,
    ) -> Result<Option<Arc<ContractPlan<T>>>> {
        let Some(slot) = self.slot(key) else {
            return Ok(None);
        };
        slot.get().map(|entry| downcast(key, entry)).transpose()
    }

    fn slot(&self, key: &ContractKey) -> Option<Slot> {
        self.entries.get(key).map(|slot| Arc::clone(slot.value()))
    }

    fn get_or_build<T, F>(&self, key: ContractKey, build: F) -> Result<Arc<ContractPlan<T>>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<ContractPlan<T>>,
    {
        let slot = match self.slot(&key) {
            Some(slot) => slot,
            None => Arc::clone(self.entries.entry(key.clone()).or_default().value()),
        };

        let entry = slot.get_or_try_init(|| {
            let plan = build()?;
            self.builds.fetch_add(1, Ordering::Relaxed);
            info!(
                contract = %key,
                fields = plan.fields().len(),
                "Built materialization strategy"
            );
            let info = ContractInfo::new(key.name(), plan.fields());
            Ok::<_, BuilderError>(RegistryEntry {
                plan: Arc::new(plan),
                info,
            })
        })?;

        downcast(&key, entry)
    }

    /// True if a plan has been built for `key`.
    #[must_use]
    pub fn contains(&self, key: &ContractKey) -> bool {
        self.slot(key).is_some_and(|slot| slot.get().is_some())
    }

    /// Metadata for a built contract.
    #[must_use]
    pub fn info(&self, key: &ContractKey) -> Option<ContractInfo> {
        self.slot(key)
            .and_then(|slot| slot.get().map(|entry| entry.info.clone()))
    }

    /// Metadata for every built contract, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<ContractInfo> {
        let mut result: Vec<_> = self
            .entries
            .iter()
            .filter_map(|slot| slot.value().get().map(|entry| entry.info.clone()))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    /// Number of built contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.value().get().is_some())
            .count()
    }

    /// Returns true if no contract has been built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of strategy builds performed.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Remove all cached plans (primarily for tests).
    pub fn clear(&self) {
        debug!(entries = self.entries.len(), "Clearing contract registry");
        self.entries.clear();
    }
}

fn downcast<T: Send + Sync + 'static>(
    key: &ContractKey,
    entry: &RegistryEntry,
) -> Result<Arc<ContractPlan<T>>> {
    Arc::clone(&entry.plan)
        .downcast::<ContractPlan<T>>()
        .map_err(|_| {
            BuilderError::contract_violation(
                key.name(),
                "cached strategy does not produce the requested instance type",
            )
        })
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contract_count", &self.len())
            .field("build_count", &self.build_count())
            .finish()
    }
}

/// Global contract registry.
pub static REGISTRY: LazyLock<Arc<ContractRegistry>> =
    LazyLock::new(|| Arc::new(ContractRegistry::new()));

/// Gets the global contract registry.
#[must_use]
pub fn global_registry() -> Arc<ContractRegistry> {
    Arc::clone(&REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::FieldType;
    use std::sync::Barrier;
    use std::thread;

    static SLOW_DEFINES: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Slow {
        name: String,
    }

    impl Contract for Slow {
        fn define(definition: ContractDefinition<Self>) -> ContractDefinition<Self> {
            SLOW_DEFINES.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            definition.field("Name", |s: &mut Self, v: String| s.name = v)
        }

        fn contract_name() -> &'static str {
            "Slow"
        }
    }

    #[derive(Debug, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Contract for Point {
        fn define(definition: ContractDefinition<Self>) -> ContractDefinition<Self> {
            definition
                .field("X", |p: &mut Self, v: i64| p.x = v)
                .field("Y", |p: &mut Self, v: i64| p.y = v)
        }

        fn contract_name() -> &'static str {
            "Point"
        }
    }

    #[derive(Debug, Default)]
    struct Empty;

    impl Contract for Empty {
        fn define(definition: ContractDefinition<Self>) -> ContractDefinition<Self> {
            definition
        }
    }

    #[test]
    fn test_get_or_create_reuses_plan() {
        let registry = ContractRegistry::new();
        let first = registry.get_or_create::<Point>().unwrap();
        let second = registry.get_or_create::<Point>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.build_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(first.fields()[0].name, "X");
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let registry = Arc::new(ContractRegistry::new());
        let barrier = Arc::new(Barrier::new(8));
        let before = SLOW_DEFINES.load(Ordering::SeqCst);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create::<Slow>().unwrap()
                })
            })
            .collect();

        let plans: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(SLOW_DEFINES.load(Ordering::SeqCst) - before, 1);
        assert_eq!(registry.build_count(), 1);
        assert!(plans.iter().all(|plan| Arc::ptr_eq(plan, &plans[0])));
        assert!(plans.iter().all(|plan| plan.fields().len() == 1));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let registry = ContractRegistry::new();
        let err = registry.get_or_create::<Empty>().unwrap_err();

        assert_eq!(err.code(), "BUILDER-001-INVALID_CONTRACT");
        assert!(!registry.contains(&ContractKey::of::<Empty>()));
        assert!(registry.is_empty());
        assert_eq!(registry.build_count(), 0);
    }

    #[test]
    fn test_lookup_does_not_build() {
        let registry = ContractRegistry::new();
        assert!(registry.lookup::<Point>().unwrap().is_none());

        registry.get_or_create::<Point>().unwrap();
        assert!(registry.lookup::<Point>().unwrap().is_some());
    }

    #[test]
    fn test_schema_registration() {
        let registry = ContractRegistry::new();
        let schema = ContractSchema::new("Person").field("FirstName", FieldType::String);

        let first = registry.get_or_create_schema(&schema).unwrap();
        let second = registry.get_or_create_schema(&schema.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let info = registry.info(&ContractKey::schema("Person")).unwrap();
        assert_eq!(info.fingerprint, schema.fingerprint());
    }

    #[test]
    fn test_schema_name_conflict() {
        let registry = ContractRegistry::new();
        let v1 = ContractSchema::new("Person").field("FirstName", FieldType::String);
        let v2 = v1.clone().field("Age", FieldType::Int);

        registry.get_or_create_schema(&v1).unwrap();
        let err = registry.get_or_create_schema(&v2).unwrap_err();
        assert!(err.to_string().contains("different field set"));
    }

    #[test]
    fn test_mismatched_instance_type_is_violation() {
        let registry = ContractRegistry::new();
        registry.get_or_create::<Point>().unwrap();

        let err = registry
            .lookup_key::<DynamicObject>(&ContractKey::of::<Point>())
            .unwrap_err();
        assert_eq!(err.code(), "BUILDER-005-CONTRACT_VIOLATION");
    }

    #[test]
    fn test_list_sorted_and_clear() {
        let registry = ContractRegistry::new();
        registry.get_or_create::<Point>().unwrap();
        registry
            .get_or_create_schema(&ContractSchema::new("Animal").field("Kind", FieldType::String))
            .unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|info| info.name).collect();
        assert_eq!(names, vec!["Animal".to_string(), "Point".to_string()]);

        registry.clear();
        assert!(registry.is_empty());
    }
}
