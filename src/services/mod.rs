//! Service layer: long-running workers and request-triggered helpers.

pub mod upload;
