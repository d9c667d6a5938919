//! HTTP request handlers for API endpoints.

pub mod basic;
pub mod push;
