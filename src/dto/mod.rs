//! DTOs that bridge services with the backend and the console.

pub mod api;
pub mod view;
