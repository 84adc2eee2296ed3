//! Resource Lifecycle Commands
//!
//! Each command works on one resource instance whose state lives in a JSON
//! file. `apply` plans against that state and carries out the plan,
//! replacing the resource when a ForceNew attribute changed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use stratus_provider::schema::{PlanAction, PlannedChange};
use stratus_provider::{DynamicValue, StratusProvider};
use tracing::info;

use crate::client::{read_value, write_state};
use crate::output::{
    print_json, print_message, print_state, print_success, print_warning, OutputFormat,
};

#[derive(Args)]
pub struct PlanArgs {
    /// Resource type name
    pub type_name: String,

    /// Desired configuration (JSON); omit to plan a delete
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// State file of the existing resource
    #[arg(short, long)]
    pub state: PathBuf,
}

#[derive(Args)]
pub struct StateArgs {
    /// Resource type name
    pub type_name: String,

    /// State file of the resource
    #[arg(short, long)]
    pub state: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Resource type name
    pub type_name: String,

    /// Identifier of the existing object
    pub id: String,

    /// State file to write
    #[arg(short, long)]
    pub state: PathBuf,
}

fn read_config(path: Option<&PathBuf>) -> Result<DynamicValue> {
    match path {
        Some(path) => read_value(path),
        None => Ok(DynamicValue::Null),
    }
}

fn describe_plan(type_name: &str, plan: &PlannedChange, format: OutputFormat) {
    if let OutputFormat::Json = format {
        print_json(plan);
        return;
    }

    let action = match plan.action {
        PlanAction::Create => plan.action.to_string().green(),
        PlanAction::Update => plan.action.to_string().yellow(),
        PlanAction::Replace | PlanAction::Delete => plan.action.to_string().red(),
        PlanAction::NoOp => plan.action.to_string().normal(),
    };
    println!("{}: {}", type_name.bold(), action);
    for name in &plan.changed {
        let marker = if plan.requires_replace.contains(name) {
            " (forces replacement)"
        } else {
            ""
        };
        println!("  ~ {}{}", name, marker);
    }
}

pub fn plan(provider: &StratusProvider, args: PlanArgs, format: OutputFormat) -> Result<()> {
    let prior = read_value(&args.state)?;
    let proposed = read_config(args.config.as_ref())?;
    let plan = provider.plan_resource_change(&args.type_name, Some(&prior), &proposed)?;
    describe_plan(&args.type_name, &plan, format);
    Ok(())
}

pub async fn apply(provider: &StratusProvider, args: PlanArgs, format: OutputFormat) -> Result<()> {
    let prior = read_value(&args.state)?;
    let proposed = read_config(args.config.as_ref())?;
    let plan = provider.plan_resource_change(&args.type_name, Some(&prior), &proposed)?;
    describe_plan(&args.type_name, &plan, format);

    let state = match plan.action {
        PlanAction::NoOp => {
            print_message("No changes.", format);
            return Ok(());
        }
        PlanAction::Replace => {
            info!(
                "Replacing {} because of {:?}",
                args.type_name, plan.requires_replace
            );
            provider
                .apply_resource_change(&args.type_name, Some(&prior), &DynamicValue::Null)
                .await?;
            write_state(&args.state, &DynamicValue::Null)?;
            provider
                .apply_resource_change(&args.type_name, None, &plan.planned_state)
                .await?
        }
        PlanAction::Create | PlanAction::Update | PlanAction::Delete => {
            provider
                .apply_resource_change(&args.type_name, Some(&prior), &plan.planned_state)
                .await?
        }
    };

    write_state(&args.state, &state)?;
    if state.is_null() {
        print_success(&format!("{} destroyed", args.type_name));
    } else {
        print_success(&format!(
            "{} {} applied",
            args.type_name,
            state.get("id").and_then(|v| v.as_string()).unwrap_or("")
        ));
        print_state(&state, format);
    }
    Ok(())
}

pub async fn read(provider: &StratusProvider, args: StateArgs, format: OutputFormat) -> Result<()> {
    let state = read_value(&args.state)?;
    match provider.read_resource(&args.type_name, &state).await? {
        Some(refreshed) => {
            write_state(&args.state, &refreshed)?;
            print_state(&refreshed, format);
        }
        None => {
            write_state(&args.state, &DynamicValue::Null)?;
            print_warning(&format!(
                "{} no longer exists; state removed",
                args.type_name
            ));
        }
    }
    Ok(())
}

pub async fn import(provider: &StratusProvider, args: ImportArgs, format: OutputFormat) -> Result<()> {
    let state = provider
        .import_resource_state(&args.type_name, &args.id)
        .await?;
    write_state(&args.state, &state)?;
    print_success(&format!("Imported {} {}", args.type_name, args.id));
    print_state(&state, format);
    Ok(())
}

pub async fn destroy(provider: &StratusProvider, args: StateArgs) -> Result<()> {
    let state = read_value(&args.state)?;
    if state.is_null() {
        print_warning(&format!("No state in {}", args.state.display()));
        return Ok(());
    }
    provider
        .apply_resource_change(&args.type_name, Some(&state), &DynamicValue::Null)
        .await?;
    write_state(&args.state, &DynamicValue::Null)?;
    print_success(&format!("{} destroyed", args.type_name));
    Ok(())
}
