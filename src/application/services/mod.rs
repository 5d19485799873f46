//! Application services

mod record;

pub use record::RecordService;
