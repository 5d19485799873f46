//! Logical peer identifiers

use std::borrow::Cow;
use std::fmt;

/// Identifies a logical peer service (e.g. `"order-service"`).
///
/// Selects the breaker, retry and bulkhead configuration used for every
/// call to that peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey(Cow<'static, str>);

impl DependencyKey {
    pub const USER_SERVICE: DependencyKey = DependencyKey::from_static("user-service");
    pub const PRODUCT_SERVICE: DependencyKey = DependencyKey::from_static("product-service");
    pub const ORDER_SERVICE: DependencyKey = DependencyKey::from_static("order-service");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DependencyKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn static_and_owned_keys_are_interchangeable() {
        let mut map = HashMap::new();
        map.insert(DependencyKey::new("order-service"), 1);
        assert_eq!(map.get(&DependencyKey::ORDER_SERVICE), Some(&1));
        assert_eq!(DependencyKey::ORDER_SERVICE.to_string(), "order-service");
    }
}
