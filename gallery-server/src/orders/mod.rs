//! Orders Module
//!
//! Order lifecycle on top of the repository layer. All status changes go
//! through [`OrderService`] so the transition rules live in one place.

mod service;

pub use service::OrderService;
