//! Domain records exposed to the service layer.

pub mod contact;
pub mod types;
