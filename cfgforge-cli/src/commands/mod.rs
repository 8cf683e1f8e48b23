//! CLI command implementations.
//!
//! - `resolve`: Build a config class from documents and overrides
//! - `variants`: List registered variants per category
//! - `validate`: Validate a schema file
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod resolve;
pub mod validate;
pub mod variants;

pub use completions::CompletionsCommand;
pub use resolve::ResolveCommand;
pub use validate::ValidateCommand;
pub use variants::VariantsCommand;
