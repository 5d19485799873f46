//! Fallback resolution and the nested-field sum type
//!
//! A nested peer object is a [`Remote<T>`]: a bare reference before
//! enrichment, the peer's payload after a successful fetch, or a clearly
//! marked placeholder when the protected chain gave up. The placeholder
//! keeps the caller-known identity so the enclosing response stays
//! structurally valid.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use super::{CallError, DependencyKey};

/// Sentinel value written into the descriptive field of a placeholder.
pub const UNAVAILABLE: &str = "unavailable";

/// A payload type served by a peer at `GET /{RESOURCE}/{id}`.
pub trait PeerResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Peer that owns this resource.
    const DEPENDENCY: DependencyKey;
    /// Path of the collection on the peer, e.g. `product-service/api/products`.
    const RESOURCE: &'static str;

    fn id(&self) -> Option<i32>;

    /// Identity-only shell.
    fn reference(id: i32) -> Self;

    /// Identity plus sentinel values.
    fn placeholder(id: i32) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    CircuitOpen,
    BulkheadFull,
    TransportFailure,
    /// No protected handle registered for the owning dependency.
    Unconfigured,
    /// The reference carried no identity to look up.
    MissingReference,
}

impl From<&CallError> for UnavailableReason {
    fn from(err: &CallError) -> Self {
        use super::Rejection;
        match err {
            CallError::Transport(_) => Self::TransportFailure,
            CallError::Rejected(Rejection::CircuitOpen) => Self::CircuitOpen,
            CallError::Rejected(Rejection::BulkheadFull) => Self::BulkheadFull,
        }
    }
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CircuitOpen => "circuit_open",
            Self::BulkheadFull => "bulkhead_full",
            Self::TransportFailure => "transport_failure",
            Self::Unconfigured => "unconfigured",
            Self::MissingReference => "missing_reference",
        }
    }
}

/// A nested object owned by a peer service.
#[derive(Debug, Clone, PartialEq)]
pub enum Remote<T> {
    /// Identity-only shell awaiting enrichment.
    Reference(T),
    /// Fetched from the owning peer.
    Present(T),
    /// Substituted after the protected chain failed.
    Unavailable { placeholder: T, reason: UnavailableReason },
}

impl<T: PeerResource> Remote<T> {
    pub fn reference(id: i32) -> Self {
        Self::Reference(T::reference(id))
    }

    pub fn unavailable(id: i32, reason: UnavailableReason) -> Self {
        Self::Unavailable {
            placeholder: T::placeholder(id),
            reason,
        }
    }

    /// Identity of the referenced object, whichever state it is in.
    pub fn id(&self) -> Option<i32> {
        self.value().id()
    }
}

impl<T> Remote<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Reference(value) | Self::Present(value) => value,
            Self::Unavailable { placeholder, .. } => placeholder,
        }
    }

    /// `true` once enrichment has run, whether or not it succeeded.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Reference(_))
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn unavailable_reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::Unavailable { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct MarkedPlaceholder<'a, T> {
    #[serde(flatten)]
    placeholder: &'a T,
    unavailable: UnavailableReason,
}

impl<T: Serialize> Serialize for Remote<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Reference(value) | Self::Present(value) => value.serialize(serializer),
            Self::Unavailable { placeholder, reason } => MarkedPlaceholder {
                placeholder,
                unavailable: *reason,
            }
            .serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
struct IncomingRemote<T> {
    #[serde(flatten)]
    value: T,
    #[serde(default)]
    unavailable: Option<UnavailableReason>,
}

/// Nested objects arriving on a write request are references: only their
/// identity is ever used, so the rest of the payload is not trusted.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Remote<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let incoming = IncomingRemote::<T>::deserialize(deserializer)?;
        Ok(match incoming.unavailable {
            Some(reason) => Self::Unavailable {
                placeholder: incoming.value,
                reason,
            },
            None => Self::Reference(incoming.value),
        })
    }
}

/// Builds the placeholder returned when a protected call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackResolver;

impl FallbackResolver {
    pub fn resolve<T: PeerResource>(
        &self,
        dependency: &DependencyKey,
        id: i32,
        last_error: &CallError,
    ) -> Remote<T> {
        let reason = UnavailableReason::from(last_error);
        warn!(
            %dependency,
            resource = T::RESOURCE,
            id,
            reason = reason.as_str(),
            error = %last_error,
            "Peer unavailable, using fallback"
        );
        metrics::counter!(
            "remote_fallbacks_total",
            "dependency" => dependency.to_string(),
            "reason" => reason.as_str()
        )
        .increment(1);
        Remote::unavailable(id, reason)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ProductDto;
    use crate::application::resilience::{Rejection, TransportError};
    use serde_json::json;

    #[test]
    fn placeholder_keeps_identity_and_marks_reason() {
        let remote: Remote<ProductDto> = FallbackResolver.resolve(
            &DependencyKey::PRODUCT_SERVICE,
            7,
            &CallError::Transport(TransportError::Timeout),
        );

        assert_eq!(remote.id(), Some(7));
        assert_eq!(remote.value().product_title.as_deref(), Some(UNAVAILABLE));
        assert_eq!(
            remote.unavailable_reason(),
            Some(UnavailableReason::TransportFailure)
        );
    }

    #[test]
    fn rejection_reasons_are_preserved() {
        let remote: Remote<ProductDto> = FallbackResolver.resolve(
            &DependencyKey::PRODUCT_SERVICE,
            7,
            &CallError::Rejected(Rejection::CircuitOpen),
        );
        assert_eq!(remote.unavailable_reason(), Some(UnavailableReason::CircuitOpen));
    }

    #[test]
    fn present_serializes_as_the_peer_object() {
        let remote = Remote::Present(ProductDto {
            product_id: Some(7),
            product_title: Some("Widget".into()),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&remote).unwrap(),
            json!({"productId": 7, "productTitle": "Widget"})
        );
    }

    #[test]
    fn unavailable_serializes_with_marker() {
        let remote = Remote::<ProductDto>::unavailable(7, UnavailableReason::CircuitOpen);
        assert_eq!(
            serde_json::to_value(&remote).unwrap(),
            json!({"productId": 7, "productTitle": "unavailable", "unavailable": "circuit_open"})
        );
    }

    #[test]
    fn incoming_nested_object_becomes_reference() {
        let remote: Remote<ProductDto> =
            serde_json::from_value(json!({"productId": 3, "productTitle": "ignored"})).unwrap();
        assert!(!remote.is_resolved());
        assert_eq!(remote.id(), Some(3));
    }
}
