//! Domain types, the signing primitive, and the storage port.

pub mod order;
pub mod params;
pub mod ports;
pub mod response_code;
pub mod signing;
