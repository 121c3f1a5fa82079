//! Generator registry
//!
//! In-memory registry mapping generator identifiers to implementations.
//! Owned by the reconciliation engine rather than process-global, so tests
//! and the CLI can assemble their own sets.

use std::collections::HashMap;
use std::sync::Arc;

use crate::deficiencies::trait_::DeficiencyGenerator;

/// Registration and lookup failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Generator '{identifier}' not found")]
    GeneratorNotFound { identifier: String },
    #[error("Generator '{identifier}' is already registered")]
    DuplicateIdentifier { identifier: String },
}

/// Registry of deficiency generators, keyed by identifier
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn DeficiencyGenerator>>,
}

impl GeneratorRegistry {
    /// An empty registry; generators are added with [`register`](Self::register).
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Register a generator under its identifier.
    ///
    /// Identifiers must be unique; a second registration under the same
    /// identifier is rejected rather than silently replacing the first.
    pub fn register(
        &mut self,
        generator: Arc<dyn DeficiencyGenerator>,
    ) -> Result<(), RegistryError> {
        let identifier = generator.identifier().to_string();
        if self.generators.contains_key(&identifier) {
            return Err(RegistryError::DuplicateIdentifier { identifier });
        }
        self.generators.insert(identifier, generator);
        Ok(())
    }

    /// Get a generator by identifier
    pub fn get(&self, identifier: &str) -> Result<Arc<dyn DeficiencyGenerator>, RegistryError> {
        self.generators.get(identifier).cloned().ok_or_else(|| {
            RegistryError::GeneratorNotFound {
                identifier: identifier.to_string(),
            }
        })
    }

    /// All generators, sorted by identifier for a deterministic run order
    pub fn list(&self) -> Vec<Arc<dyn DeficiencyGenerator>> {
        let mut generators: Vec<_> = self.generators.values().cloned().collect();
        generators.sort_by_key(|generator| generator.identifier());
        generators
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
