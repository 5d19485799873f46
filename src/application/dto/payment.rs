//! Payment wire object and its mapping to the local record

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{OrderDto, WireObject};
use crate::application::enrichment::{Enrichable, EnrichmentPipeline};
use crate::application::resilience::Remote;
use crate::domain::{DomainError, DomainResult, Payment, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    #[serde(default)]
    pub payment_id: Option<i32>,
    #[serde(default)]
    pub is_payed: bool,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub order: Remote<OrderDto>,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.payment_id,
            is_payed: payment.is_payed,
            payment_status: payment.payment_status,
            order: Remote::reference(payment.order_id),
        }
    }
}

impl TryFrom<PaymentDto> for Payment {
    type Error = DomainError;

    fn try_from(dto: PaymentDto) -> Result<Self, Self::Error> {
        let order_id = dto
            .order
            .id()
            .ok_or_else(|| DomainError::Validation("order.orderId is required".into()))?;
        Ok(Self {
            payment_id: dto.payment_id,
            order_id,
            is_payed: dto.is_payed,
            payment_status: dto.payment_status,
        })
    }
}

impl WireObject for PaymentDto {
    type Local = Payment;

    fn to_wire(local: Payment) -> Self {
        local.into()
    }

    fn to_local(self) -> DomainResult<Payment> {
        self.try_into()
    }
}

#[async_trait]
impl Enrichable for PaymentDto {
    async fn enrich(mut self, pipeline: &EnrichmentPipeline) -> Self {
        self.order = pipeline.resolve(self.order).await;
        self
    }
}
