//! Application layer: the two payment handlers.
//!
//! `PaymentInitiator` turns a checkout request into a signed redirect URL to the
//! provider. `CallbackVerifier` authenticates the provider's callback and
//! settles the order through the `OrderStore` port. Neither knows about HTTP;
//! the transport adapter lives in `interfaces::http`.

pub mod callback;
pub mod initiator;
