//! Job results: search connector, enrichment cache, failure log, the
//! orchestrating pipeline and pagination over its output.

pub mod cache;
pub mod failure_log;
pub mod pagination;
pub mod pipeline;
pub mod search;
