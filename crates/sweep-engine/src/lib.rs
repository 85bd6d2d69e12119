pub mod backend;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod pipeline;
pub mod probe;
pub mod reducer;
pub mod report;
pub mod resolver;
pub mod source;
pub mod stylesheet;

pub use sweep_common::error;
pub use sweep_common::protocol;
