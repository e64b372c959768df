//! The career wizard: a typed session record, the steps that fill it, and the
//! HTTP handlers that drive them.

pub mod handlers;
pub mod session;
pub mod stages;
