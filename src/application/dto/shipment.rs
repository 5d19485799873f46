//! Shipment wire object: the one record with two peer references

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{OrderDto, ProductDto, WireObject};
use crate::application::enrichment::{Enrichable, EnrichmentPipeline};
use crate::application::resilience::Remote;
use crate::domain::{DomainError, DomainResult, Shipment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDto {
    #[serde(default)]
    pub shipment_id: Option<i32>,
    #[validate(range(min = 1, message = "orderedQuantity must be at least 1"))]
    pub ordered_quantity: i32,
    pub product: Remote<ProductDto>,
    pub order: Remote<OrderDto>,
}

impl From<Shipment> for ShipmentDto {
    fn from(shipment: Shipment) -> Self {
        Self {
            shipment_id: shipment.shipment_id,
            ordered_quantity: shipment.ordered_quantity,
            product: Remote::reference(shipment.product_id),
            order: Remote::reference(shipment.order_id),
        }
    }
}

impl TryFrom<ShipmentDto> for Shipment {
    type Error = DomainError;

    fn try_from(dto: ShipmentDto) -> Result<Self, Self::Error> {
        let product_id = dto
            .product
            .id()
            .ok_or_else(|| DomainError::Validation("product.productId is required".into()))?;
        let order_id = dto
            .order
            .id()
            .ok_or_else(|| DomainError::Validation("order.orderId is required".into()))?;
        Ok(Self {
            shipment_id: dto.shipment_id,
            product_id,
            order_id,
            ordered_quantity: dto.ordered_quantity,
        })
    }
}

impl WireObject for ShipmentDto {
    type Local = Shipment;

    fn to_wire(local: Shipment) -> Self {
        local.into()
    }

    fn to_local(self) -> DomainResult<Shipment> {
        self.try_into()
    }
}

/// Both references are independent, so they are fetched concurrently.
#[async_trait]
impl Enrichable for ShipmentDto {
    async fn enrich(self, pipeline: &EnrichmentPipeline) -> Self {
        let (product, order) =
            tokio::join!(pipeline.resolve(self.product), pipeline.resolve(self.order));
        Self {
            product,
            order,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dto(quantity: i32) -> ShipmentDto {
        serde_json::from_value(json!({
            "orderedQuantity": quantity,
            "product": {"productId": 7},
            "order": {"orderId": 3}
        }))
        .unwrap()
    }

    #[test]
    fn zero_quantity_fails_validation() {
        assert!(dto(0).validate().is_err());
        assert!(dto(2).validate().is_ok());
    }

    #[test]
    fn both_references_map_to_local_keys() {
        let shipment = Shipment::try_from(dto(2)).unwrap();
        assert_eq!(shipment.product_id, 7);
        assert_eq!(shipment.order_id, 3);
        assert_eq!(shipment.shipment_id, None);
    }

    #[test]
    fn missing_order_reference_is_rejected() {
        let dto: ShipmentDto = serde_json::from_value(json!({
            "orderedQuantity": 1,
            "product": {"productId": 7},
            "order": {}
        }))
        .unwrap();
        assert!(matches!(
            Shipment::try_from(dto),
            Err(DomainError::Validation(_))
        ));
    }
}
