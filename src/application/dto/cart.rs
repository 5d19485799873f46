//! Cart wire object and its mapping to the local record

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserDto, WireObject};
use crate::application::enrichment::{Enrichable, EnrichmentPipeline};
use crate::application::resilience::Remote;
use crate::domain::{Cart, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    #[serde(default)]
    pub cart_id: Option<i32>,
    pub user: Remote<UserDto>,
}

impl From<Cart> for CartDto {
    fn from(cart: Cart) -> Self {
        Self {
            cart_id: cart.cart_id,
            user: Remote::reference(cart.user_id),
        }
    }
}

impl TryFrom<CartDto> for Cart {
    type Error = DomainError;

    fn try_from(dto: CartDto) -> Result<Self, Self::Error> {
        let user_id = dto
            .user
            .id()
            .ok_or_else(|| DomainError::Validation("user.userId is required".into()))?;
        Ok(Self {
            cart_id: dto.cart_id,
            user_id,
        })
    }
}

impl WireObject for CartDto {
    type Local = Cart;

    fn to_wire(local: Cart) -> Self {
        local.into()
    }

    fn to_local(self) -> DomainResult<Cart> {
        self.try_into()
    }
}

#[async_trait]
impl Enrichable for CartDto {
    async fn enrich(mut self, pipeline: &EnrichmentPipeline) -> Self {
        self.user = pipeline.resolve(self.user).await;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_record_maps_to_reference_shell() {
        let dto = CartDto::from(Cart {
            cart_id: Some(1),
            user_id: 4,
        });
        assert_eq!(dto.cart_id, Some(1));
        assert!(!dto.user.is_resolved());
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({"cartId": 1, "user": {"userId": 4}})
        );
    }

    #[test]
    fn absent_identity_stays_absent() {
        let dto: CartDto = serde_json::from_value(json!({"user": {"userId": 4}})).unwrap();
        let cart = Cart::try_from(dto).unwrap();
        assert_eq!(cart.cart_id, None);
        assert_eq!(cart.user_id, 4);
    }

    #[test]
    fn missing_user_reference_is_rejected() {
        let dto: CartDto = serde_json::from_value(json!({"cartId": 2, "user": {}})).unwrap();
        assert!(matches!(
            Cart::try_from(dto),
            Err(DomainError::Validation(_))
        ));
    }
}
