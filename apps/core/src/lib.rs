pub mod activation;
pub mod backend;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod executor;
pub mod hotkey;
pub mod hotkey_runtime;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod startup;
