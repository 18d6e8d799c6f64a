//! Payload capture CLI library
//!
//! Exposes the command implementations for integration testing

pub mod cli;
pub mod exchange_file;
pub mod logging;

pub use exchange_file::ExchangeFile;
pub use logging::init_tracing;
