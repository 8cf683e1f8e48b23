//! Command to build a config class and print the result.

use crate::error::CliError;
use crate::utils::{load_schema, parse_assignment, GlobalOptions, OutputFormat};
use cfgforge::{
    deep_merge_all, load_document, normalize, CollisionPolicy, ResolveOptions, Resolver, Value,
    DEFAULT_SEPARATOR,
};
use clap::Args;
use std::path::PathBuf;

/// Build a config class from documents and overrides.
///
/// Documents are deep-merged in the order given, then `--set` overrides are
/// applied on top. The result is printed as a nested or flat mapping.
#[derive(Args)]
pub struct ResolveCommand {
    /// Schema file declaring the config classes
    #[arg(long, value_name = "PATH", env = "CFGFORGE_SCHEMA")]
    pub schema: PathBuf,

    /// Class to build
    #[arg(long, value_name = "NAME")]
    pub class: String,

    /// Nested YAML or JSON document (repeatable, later files win)
    #[arg(long = "file", short = 'f', value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Flat override such as `model.layers=8` (repeatable)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    /// Fail on type mismatches and missing fields instead of warning
    #[arg(long)]
    pub strict: bool,

    /// Print dotted keys instead of a nested mapping
    #[arg(long)]
    pub flat: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Separator between segments of override keys
    #[arg(long, value_name = "CHAR", default_value_t = DEFAULT_SEPARATOR)]
    pub separator: char,

    /// Fail when an override key is both a value and a prefix
    #[arg(long)]
    pub reject_collisions: bool,
}

impl ResolveCommand {
    /// Execute the resolve command.
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        if self.separator.is_whitespace() {
            return Err(CliError::InvalidArguments(
                "separator cannot be whitespace".to_string(),
            ));
        }

        let schema = load_schema(&self.schema)?;
        let class = schema.class(&self.class)?;

        let options = ResolveOptions {
            strict: self.strict,
            separator: self.separator,
            collision: if self.reject_collisions {
                CollisionPolicy::Reject
            } else {
                CollisionPolicy::Promote
            },
        };

        let mut layers = Vec::with_capacity(self.files.len() + 1);
        for file in &self.files {
            log::info!("loading document {}", file.display());
            layers.push(load_document(file)?);
        }
        let overrides = self
            .overrides
            .into_iter()
            .map(|(key, value)| (key, Value::Str(value)));
        layers.push(normalize(overrides, options.separator, options.collision)?);

        log::debug!(
            "resolving {} from {} layer(s) (strict: {})",
            class.name(),
            layers.len(),
            options.strict
        );
        let resolver = Resolver::with_options(schema.registry(), options);
        let instance = resolver.build_from_nested(&class, deep_merge_all(layers))?;

        print!("{}", self.format.render(&instance.to_mapping(self.flat))?);
        Ok(())
    }
}
