//! Payment domain entity

use serde::{Deserialize, Serialize};

use crate::domain::repositories::{Record, Repository, RepositoryProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: Option<i32>,
    /// Foreign reference into `order-service`
    pub order_id: i32,
    pub is_payed: bool,
    pub payment_status: PaymentStatus,
}

impl Record for Payment {
    const ENTITY: &'static str = "Payment";

    fn id(&self) -> Option<i32> {
        self.payment_id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.payment_id = Some(id);
        self
    }

    fn repository(repos: &dyn RepositoryProvider) -> &dyn Repository<Self> {
        repos.payments()
    }
}
