// Frameworks layer: environment config, production wiring and the command-line entry point.

pub mod cli;
pub mod client;
pub mod config;
