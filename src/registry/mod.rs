// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::generator::AssertionGenerator;
use crate::wire::{AssertionDescription, IdentityType};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("a generator for this identity/authority pair is already registered")]
    Duplicate,
}

/// Process-wide lookup of assertion generators, keyed by the identity and
/// authority type each generator reports for itself. Populated once at
/// startup, then shared read-only.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: HashMap<(IdentityType, String), Arc<dyn AssertionGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `generator` under its own descriptors. Re-binding a pair is
    /// refused, so startup order cannot silently shadow a generator.
    pub fn register(
        &mut self,
        generator: Arc<dyn AssertionGenerator>,
    ) -> Result<(), RegistryError> {
        let key = (
            generator.identity_type(),
            generator.authority_type().to_string(),
        );
        match self.generators.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate),
            Entry::Vacant(entry) => {
                entry.insert(generator);
                Ok(())
            }
        }
    }

    /// Look up the generator serving `description`, if any.
    pub fn find(&self, description: &AssertionDescription) -> Option<Arc<dyn AssertionGenerator>> {
        let key = (
            description.identity_type,
            description.authority_type.clone(),
        );
        self.generators.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SgxLocalAssertionGenerator;
    use crate::sgx::{Report, ReportData, ReportError, ReportSource, TargetInfo, REPORT_SIZE};

    struct ZeroReports;

    impl ReportSource for ZeroReports {
        fn get_report(
            &self,
            _target_info: &TargetInfo,
            _report_data: &ReportData,
        ) -> Result<Report, ReportError> {
            Ok([0u8; REPORT_SIZE].into())
        }
    }

    #[test]
    fn register_and_find() {
        let mut registry = GeneratorRegistry::new();
        let generator = Arc::new(SgxLocalAssertionGenerator::new(ZeroReports));
        registry.register(generator).unwrap();

        assert!(registry.find(&AssertionDescription::sgx_local()).is_some());

        let foreign = AssertionDescription {
            identity_type: IdentityType::Null,
            authority_type: "Any".to_string(),
        };
        assert!(registry.find(&foreign).is_none());
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let mut registry = GeneratorRegistry::new();
        registry
            .register(Arc::new(SgxLocalAssertionGenerator::new(ZeroReports)))
            .unwrap();
        let error = registry
            .register(Arc::new(SgxLocalAssertionGenerator::new(ZeroReports)))
            .unwrap_err();
        assert!(matches!(error, RegistryError::Duplicate));
    }
}
