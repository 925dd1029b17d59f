//! Outbound event plumbing for connected transports.

pub mod hub;
pub mod protocol;
