//! Materializes contract instances from canonical field maps.

use std::sync::Arc;
use tracing::debug;

use crate::contract::{Contract, ContractPlan, ContractRegistry};
use crate::errors::{BuilderError, Result};
use crate::pipeline::{CanonicalFieldMap, TypePolicy};

/// Turns canonical field maps into instances using cached plans.
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    registry: Arc<ContractRegistry>,
}

impl InstanceBuilder {
    /// Creates a builder over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ContractRegistry>) -> Self {
        Self { registry }
    }

    /// Materializes `T` using the plan already registered for it.
    ///
    /// Does not build plans. A contract that has never been seen by the
    /// registry is a [`BuilderError::ContractViolation`].
    pub fn materialize<T: Contract>(&self, map: CanonicalFieldMap, policy: TypePolicy) -> Result<T> {
        let plan = self.registry.lookup::<T>()?.ok_or_else(|| {
            BuilderError::contract_violation(
                T::contract_name(),
                "no materialization strategy has been built",
            )
        })?;
        Self::materialize_with(&plan, map, policy)
    }

    /// Materializes an instance with `plan`.
    ///
    /// Keys that do not name a declared field are ignored. A value the
    /// field's setter refuses goes through the incompatible-type policy.
    /// Every required field must end up assigned.
    pub fn materialize_with<T>(
        plan: &ContractPlan<T>,
        map: CanonicalFieldMap,
        policy: TypePolicy,
    ) -> Result<T> {
        let mut instance = plan.instantiate();
        let mut assigned = vec![false; plan.fields().len()];

        for (name, value) in map {
            let Some(slot) = plan.slot(&name) else {
                continue;
            };
            match plan.assign(&mut instance, slot, value) {
                Ok(()) => assigned[slot] = true,
                Err(rejected) => {
                    policy.on_incompatible(plan.name(), &plan.fields()[slot], rejected.found)?;
                }
            }
        }

        if let Some(field) = plan
            .fields()
            .iter()
            .zip(&assigned)
            .find(|(field, done)| field.required && !**done)
            .map(|(field, _)| field)
        {
            return Err(BuilderError::field_violation(
                plan.name(),
                &field.name,
                "required field was not assigned",
            ));
        }

        debug!(
            contract = plan.name(),
            assigned = assigned.iter().filter(|done| **done).count(),
            "Materialized contract instance"
        );
        Ok(instance)
    }
}
