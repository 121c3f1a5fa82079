//! Deficiencies module
//!
//! This module provides the deficiency generation SDK including:
//! - The `DeficiencyGenerator` trait defining the interface every
//!   generator implements
//! - The registry the reconciliation engine iterates
//! - Origin tag parsing and content fingerprinting
//! - The generator implementations that ship with the service

pub mod fingerprint;
pub mod incomplete_profile;
pub mod missing_documents;
pub mod origin;
pub mod registry;
pub mod trait_;

pub use incomplete_profile::IncompleteProfileGenerator;
pub use missing_documents::MissingDocumentsGenerator;
pub use origin::{CURRENT_ORIGIN, LEGACY_V1_ORIGIN, LegacyOrigin, OriginTag};
pub use registry::{GeneratorRegistry, RegistryError};
pub use trait_::{Deficiency, DeficiencyGenerator, GeneratorError};

use std::sync::Arc;

/// Build the registry holding every generator that ships with the service.
///
/// `general_alert` deliberately has no generator: records in that category
/// are written by other parts of the product and reconciliation never
/// touches them.
pub fn default_registry(portal_base_url: &str) -> GeneratorRegistry {
    let mut registry = GeneratorRegistry::new();
    registry
        .register(Arc::new(MissingDocumentsGenerator::new(portal_base_url)))
        .expect("builtin generator identifiers are unique");
    registry
        .register(Arc::new(IncompleteProfileGenerator::new(portal_base_url)))
        .expect("builtin generator identifiers are unique");
    registry
}
