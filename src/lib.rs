// Library exports for the CLI binary and integration tests

pub mod api;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod events;
pub mod logging;
pub mod orders;
pub mod shutdown;
pub mod status;
pub mod upload;
pub mod validation;
