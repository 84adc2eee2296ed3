//! Type and Schema Commands

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use stratus_provider::schema::{Attribute, AttributeType, Presence};
use stratus_provider::StratusProvider;

use crate::client::read_value;
use crate::output::{print_json, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct SchemaArgs {
    /// Resource or data source type name
    pub type_name: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Resource type name
    pub type_name: String,

    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Registered type for display
#[derive(Serialize)]
pub struct TypeDisplay {
    pub type_name: String,
    pub kind: &'static str,
}

impl TableDisplay for TypeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Type", "Kind"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.type_name.clone(), self.kind.to_string()]
    }
}

/// Attribute display wrapper
#[derive(Serialize)]
pub struct AttributeDisplay {
    pub name: String,
    pub ty: String,
    pub presence: &'static str,
    pub force_new: bool,
    pub default: String,
}

impl From<&Attribute> for AttributeDisplay {
    fn from(attr: &Attribute) -> Self {
        Self {
            name: attr.name.to_string(),
            ty: type_label(&attr.ty),
            presence: match attr.presence {
                Presence::Required => "required",
                Presence::Optional => "optional",
                Presence::Computed => "computed",
                Presence::OptionalComputed => "optional, computed",
            },
            force_new: attr.force_new,
            default: attr
                .default
                .as_ref()
                .map(|d| serde_json::to_string(d).unwrap_or_default())
                .unwrap_or_default(),
        }
    }
}

impl TableDisplay for AttributeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Attribute", "Type", "Presence", "Force New", "Default"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.ty.clone(),
            self.presence.to_string(),
            if self.force_new { "yes" } else { "" }.to_string(),
            self.default.clone(),
        ]
    }
}

fn type_label(ty: &AttributeType) -> String {
    match ty {
        AttributeType::String => "string".to_string(),
        AttributeType::Bool => "bool".to_string(),
        AttributeType::Int => "int".to_string(),
        AttributeType::List(elem) => format!("list({})", type_label(elem)),
        AttributeType::Set(elem) => format!("set({})", type_label(elem)),
        AttributeType::Map(elem) => format!("map({})", type_label(elem)),
        AttributeType::Object(attrs) => format!(
            "object({})",
            attrs.iter().map(|a| a.name).collect::<Vec<_>>().join(", ")
        ),
    }
}

pub fn types(provider: &StratusProvider, format: OutputFormat) {
    let items: Vec<TypeDisplay> = provider
        .resource_types()
        .into_iter()
        .map(|t| TypeDisplay {
            type_name: t.to_string(),
            kind: "resource",
        })
        .chain(provider.data_source_types().into_iter().map(|t| TypeDisplay {
            type_name: t.to_string(),
            kind: "data source",
        }))
        .collect();
    print_list(&items, format);
}

pub fn schema(provider: &StratusProvider, args: SchemaArgs, format: OutputFormat) -> Result<()> {
    let schema = provider.schema(&args.type_name)?;
    match format {
        OutputFormat::Json => print_json(&schema),
        _ => {
            let rows: Vec<AttributeDisplay> =
                schema.attributes.iter().map(AttributeDisplay::from).collect();
            print_list(&rows, format);
        }
    }
    Ok(())
}

pub fn validate(provider: &StratusProvider, args: ValidateArgs, format: OutputFormat) -> Result<()> {
    let config = read_value(&args.config)?;
    let diags = provider.validate_resource_config(&args.type_name, &config)?;
    if diags.is_empty() {
        print_success(&format!("{} configuration is valid", args.type_name));
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&diags),
        _ => {
            for diag in &diags {
                crate::output::print_error(&diag.to_string());
            }
        }
    }
    bail!("{} validation error(s)", diags.len())
}
