//! Handler Layer
//!
//! Validates offload requests before they reach the service.

pub mod task_handler;

pub use task_handler::TaskHandler;
