use std::collections::HashMap;

use crate::application::resilience::{AddressResolver, DependencyKey};

/// Fixed `DependencyKey -> base URL` table loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressResolver {
    addresses: HashMap<DependencyKey, String>,
}

impl StaticAddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dependency: DependencyKey, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.addresses
            .insert(dependency, base_url.trim_end_matches('/').to_string());
        self
    }
}

impl AddressResolver for StaticAddressResolver {
    fn resolve(&self, dependency: &DependencyKey) -> Option<String> {
        self.addresses.get(dependency).cloned()
    }
}
