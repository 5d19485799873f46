//! Outbound calls to peer services

mod http;
mod resolver;

pub use http::HttpExecutor;
pub use resolver::StaticAddressResolver;
