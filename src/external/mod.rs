pub mod client;

pub use client::{ExternalError, HTTP_CLIENT, fetch_json};
