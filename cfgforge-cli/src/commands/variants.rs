//! Command to list the variants registered in a schema.

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// List the registered variants of each category.
#[derive(Args)]
pub struct VariantsCommand {
    /// Schema file declaring the config classes
    #[arg(long, value_name = "PATH", env = "CFGFORGE_SCHEMA")]
    pub schema: PathBuf,

    /// Only list the variants this class accepts, one name per line
    #[arg(value_name = "CLASS")]
    pub class: Option<String>,
}

impl VariantsCommand {
    /// Execute the variants command.
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(&self.schema)?;
        let registry = schema.registry();

        if let Some(name) = self.class {
            let class = schema.class(&name)?;
            for variant in registry.variants_of(&class) {
                println!("{variant}");
            }
            return Ok(());
        }

        for root in registry.categories() {
            let variants = registry.variants(root);
            if variants.is_empty() {
                println!("{}: (no variants)", root.name());
            } else {
                println!("{}: {}", root.name(), variants.join(", "));
            }
        }
        Ok(())
    }
}
