//! Wire objects served over HTTP and the peer payloads they embed.

mod cart;
mod payment;
mod peers;
mod shipment;

pub use cart::CartDto;
pub use payment::PaymentDto;
pub use peers::{OrderDto, ProductDto, UserDto};
pub use shipment::ShipmentDto;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::application::enrichment::Enrichable;
use crate::domain::{DomainResult, Record};

/// The externally visible shape of a local record.
///
/// `to_wire` never fails: every foreign key becomes an unresolved
/// reference. `to_local` fails with a validation error when a required
/// reference has no identity.
pub trait WireObject:
    Enrichable + Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static
{
    type Local: Record;

    fn to_wire(local: Self::Local) -> Self;

    fn to_local(self) -> DomainResult<Self::Local>;
}
