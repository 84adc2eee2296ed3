//! Simulator Commands

use anyhow::{anyhow, Result};
use clap::Subcommand;
use stratus_common::db::RecordSummary;
use stratus_common::Tags;
use stratus_provider::cloud::SeedResolverRule;
use stratus_provider::SimulatedCloud;

use crate::output::{print_list, print_success, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum SimCommands {
    /// List every simulated record
    List,

    /// Remove every simulated record
    Reset,

    /// Place a Route53 Resolver rule in the account
    SeedResolverRule {
        /// Rule name
        #[arg(short, long)]
        name: String,

        /// Domain the rule forwards
        #[arg(short, long)]
        domain: String,

        /// FORWARD, SYSTEM or RECURSIVE
        #[arg(long, default_value = "FORWARD")]
        rule_type: String,

        /// Resolver endpoint id
        #[arg(long)]
        endpoint: Option<String>,

        /// NOT_SHARED, SHARED_WITH_ME or SHARED_BY_ME
        #[arg(long, default_value = "NOT_SHARED")]
        share_status: String,

        /// Owning account; the caller's when unset
        #[arg(long)]
        owner: Option<String>,

        /// Rule status
        #[arg(long, default_value = "COMPLETE")]
        status: String,

        /// Tags as key=value, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Create an SES receipt rule set out of band
    SeedRuleSet {
        /// Rule set name
        name: String,
    },
}

impl TableDisplay for RecordSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Kind", "ID", "Name", "Status", "Updated"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.id.clone(),
            self.name.clone(),
            self.status.clone(),
            chrono::DateTime::from_timestamp(self.updated_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| self.updated_at.to_string()),
        ]
    }
}

fn parse_tags(raw: &[String]) -> Result<Tags> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("invalid tag {:?}, expected key=value", pair))
        })
        .collect()
}

pub fn execute(cmd: SimCommands, cloud: &SimulatedCloud, format: OutputFormat) -> Result<()> {
    match cmd {
        SimCommands::List => {
            let records = cloud.database().list_all()?;
            print_list(&records, format);
        }

        SimCommands::Reset => {
            cloud.reset()?;
            print_success("Simulator reset");
        }

        SimCommands::SeedResolverRule {
            name,
            domain,
            rule_type,
            endpoint,
            share_status,
            owner,
            status,
            tags,
        } => {
            let id = cloud.seed_resolver_rule(&SeedResolverRule {
                name,
                domain_name: domain,
                rule_type,
                resolver_endpoint_id: endpoint,
                share_status,
                owner_id: owner,
                status,
                tags: parse_tags(&tags)?,
            })?;
            print_success(&format!("Seeded resolver rule {}", id));
        }

        SimCommands::SeedRuleSet { name } => {
            cloud.seed_rule_set(&name)?;
            print_success(&format!("Seeded receipt rule set {}", name));
        }
    }

    Ok(())
}
