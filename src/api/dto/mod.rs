//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `envelope` - The `{status, message, data?, code?, details?}` wrapper
//! - `push` - Push request bodies and result payloads
//! - `info` - Service info and health payloads

mod envelope;
mod info;
pub mod push;

pub use envelope::{ApiResponse, ErrorResponse, ResponseStatus};
pub use info::{HealthData, ServiceInfo};
pub use push::{
    BatchData, BatchItemResult, BatchPushData, BatchPushRequest, BatchSummary, DeliveredData,
    FailedData, PushRequest, TargetId, codes,
};
