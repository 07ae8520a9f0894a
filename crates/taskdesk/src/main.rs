//! TaskDesk command line.
//!
//! Parses query strings into query plans and answers tenant access questions
//! against JSON fixtures, using the in-memory backends.

mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::info;

use taskdesk_persistence::backends::memory::{MemoryRoleStore, MemoryTable};
use taskdesk_persistence::core::PlanExecutor;
use taskdesk_persistence::search::{FilterParser, QueryPlanBuilder, try_coerce};
use taskdesk_persistence::tenant::{
    AccessScopeResolver, GroupId, Permission, Resource, RoleGraph, UserId,
};
use taskdesk_persistence::types::{FilterValue, QueryPlan, Schema};
use taskdesk_persistence::PlanConfig;

use crate::config::{CliConfig, Command, PlanKindArg, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    match config.command.clone() {
        Command::Plan {
            schema,
            entity,
            kind,
            assignments,
            rows,
            query,
        } => {
            let schema: Schema = read_json(&schema)?;
            let plan = build_plan(
                &schema,
                &entity,
                kind,
                &assignments,
                &query,
                config.plan_config(),
            )?;
            println!("{}", plan);
            println!("{}", serde_json::to_string_pretty(&plan)?);

            if let Some(rows) = rows {
                let rows: Vec<Value> = read_json(&rows)?;
                let table = MemoryTable::with_rows(entity, rows);
                let outcome = table.execute(&plan).await?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Command::Access {
            graph,
            user,
            permission,
            resource,
            group,
        } => {
            let graph: RoleGraph = read_json(&graph)?;
            let allowed = check_access(graph, &user, permission, resource, group.as_ref()).await?;
            if !allowed {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parses `query` under `schema` and builds the requested plan.
fn build_plan(
    schema: &Schema,
    entity: &str,
    kind: PlanKindArg,
    assignments: &[String],
    query: &str,
    plan_config: PlanConfig,
) -> anyhow::Result<QueryPlan> {
    let filters = FilterParser::with_schema(schema).parse(query)?;
    info!(entity = %entity, filters = filters.len(), "Parsed query");

    let mut builder = QueryPlanBuilder::for_schema(entity, schema)
        .with_config(plan_config)
        .from_filters(filters);
    builder = match kind {
        PlanKindArg::Select => builder.select(),
        PlanKindArg::Update => builder.update(),
        PlanKindArg::Delete => builder.delete(),
    };

    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .with_context(|| format!("assignment '{}' is not FIELD=VALUE", assignment))?;
        let value = schema
            .get(field)
            .and_then(|field_type| try_coerce(raw, field_type))
            .unwrap_or_else(|| FilterValue::String(raw.to_string()));
        builder = builder.set(field, value);
    }

    Ok(builder.build())
}

/// Prints the access decision; returns whether access is granted.
async fn check_access(
    graph: RoleGraph,
    user: &UserId,
    permission: Permission,
    resource: Resource,
    group: Option<&GroupId>,
) -> anyhow::Result<bool> {
    let resolver = AccessScopeResolver::new(Arc::new(MemoryRoleStore::from_graph(graph)));

    match group {
        Some(group) => {
            let allowed = resolver.can(permission, user, group, resource).await?;
            info!(user = %user, group = %group, allowed, "Checked access");
            println!("{}", allowed);
            Ok(allowed)
        }
        None => {
            let scope = resolver
                .all_tenants_with_access(permission, user, resource)
                .await?;
            println!("{}", serde_json::to_string(&scope)?);
            Ok(!scope.is_empty())
        }
    }
}
