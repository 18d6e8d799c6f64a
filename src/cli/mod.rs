pub mod inspect;
pub mod output;
pub mod validate;

pub use inspect::{cmd_inspect, inspect, InspectArgs, InspectReport};
pub use output::OutputFormat;
pub use validate::{cmd_validate, ValidateArgs};
