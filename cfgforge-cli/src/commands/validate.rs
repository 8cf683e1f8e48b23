//! Command to validate a schema file.

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// Validate a schema file.
///
/// Every class is declared as it would be for `resolve`, so bad type
/// expressions and defaults that do not fit their type are reported here.
#[derive(Args)]
pub struct ValidateCommand {
    /// Schema file to validate
    #[arg(value_name = "SCHEMA_PATH")]
    pub schema_path: PathBuf,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(&self.schema_path)?;
        let count = schema.classes().count();

        if !global.quiet {
            for class in schema.classes() {
                match class.parent() {
                    Some(parent) => println!("{} extends {}", class.name(), parent.name()),
                    None => println!("{}", class.name()),
                }
                for decl in class.own_fields() {
                    match decl.default() {
                        Some(default) => println!("  {}: {} = {default}", decl.name(), decl.ty()),
                        None => println!("  {}: {}", decl.name(), decl.ty()),
                    }
                }
            }
        }

        println!("Schema is valid ({count} classes)");
        Ok(())
    }
}
