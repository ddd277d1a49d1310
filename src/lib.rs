// The binary entry point is main.rs; the module tree lives here so that the
// benches, integration tests and the sample-bank generator share it.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod lookup;
pub mod model;
pub mod sample;
pub mod session;
pub mod store;
pub mod ui;
