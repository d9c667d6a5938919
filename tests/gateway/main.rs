//! Gateway tests against in-process mock providers, built as one test binary.

mod common;
mod provider_check;
mod push_api;
