//! VNPay payment bridge for the storefront.
//!
//! Two handlers implement the provider protocol: [`application::initiator`]
//! signs an outbound checkout request, and [`application::callback`] verifies
//! the signed callback and settles the order through the
//! [`domain::ports::OrderStore`] port. [`domain::signing`] is the primitive
//! both directions share.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
