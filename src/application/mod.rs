pub mod dto;
pub mod enrichment;
pub mod resilience;
pub mod services;

pub use dto::{CartDto, OrderDto, PaymentDto, ProductDto, ShipmentDto, UserDto, WireObject};
pub use enrichment::{Enrichable, EnrichmentPipeline};
pub use resilience::{DependencyKey, DependencyRegistry, Protected, Remote, ResilienceSettings};
pub use services::RecordService;
