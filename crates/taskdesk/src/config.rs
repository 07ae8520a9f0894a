//! Command line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TASKDESK_LOG_LEVEL` | info | Log level |
//! | `TASKDESK_DEFAULT_PAGE_SIZE` | 20 | Limit of select plans without `limit` |
//! | `TASKDESK_MAX_PAGE_SIZE` | unset | Upper bound for any limit |

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use taskdesk_persistence::PlanConfig;
use taskdesk_persistence::tenant::{GroupId, Permission, Resource, UserId};
use taskdesk_persistence::types::DEFAULT_PAGE_SIZE;

/// TaskDesk command line configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "taskdesk")]
#[command(about = "Plan task queries and check tenant access")]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "TASKDESK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Page size of select plans without an explicit limit.
    #[arg(long, global = true, env = "TASKDESK_DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: u64,

    /// Upper bound for any limit.
    #[arg(long, global = true, env = "TASKDESK_MAX_PAGE_SIZE")]
    pub max_page_size: Option<u64>,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a query string into a plan, and optionally run it on JSON rows.
    Plan {
        /// Schema file: a JSON list of `{"name": ..., "type": ...}`.
        #[arg(long)]
        schema: PathBuf,

        /// Entity the plan targets.
        #[arg(long, default_value = "task")]
        entity: String,

        /// Statement kind.
        #[arg(long, value_enum, default_value_t = PlanKindArg::Select)]
        kind: PlanKindArg,

        /// Assignments of an update plan, as `field=value`.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,

        /// JSON file holding a list of rows to execute the plan against.
        #[arg(long)]
        rows: Option<PathBuf>,

        /// The query string, e.g. `age_gte=18&orderby=-title`.
        query: String,
    },

    /// Check access against a role graph file.
    Access {
        /// Role graph file: `{groups, role_types, roles, rights}`.
        #[arg(long)]
        graph: PathBuf,

        /// User to check.
        #[arg(long)]
        user: UserId,

        /// Requested permission, e.g. `read` or `read|update`.
        #[arg(long)]
        permission: Permission,

        /// Target resource, e.g. `task`.
        #[arg(long)]
        resource: Resource,

        /// Check one group instead of listing every reachable group.
        #[arg(long)]
        group: Option<GroupId>,
    },
}

/// Statement kind accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanKindArg {
    /// Read rows.
    Select,
    /// Modify rows.
    Update,
    /// Remove rows.
    Delete,
}

impl CliConfig {
    /// Returns the paging configuration for the plan builder.
    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let errors = self.plan_config().problems();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("taskdesk={},taskdesk_persistence={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_command() {
        let config = CliConfig::try_parse_from([
            "taskdesk",
            "plan",
            "--schema",
            "task.json",
            "--max-page-size",
            "50",
            "age_gte=18",
        ])
        .unwrap();

        assert_eq!(config.max_page_size, Some(50));
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        match config.command {
            Command::Plan {
                entity, kind, query, ..
            } => {
                assert_eq!(entity, "task");
                assert_eq!(kind, PlanKindArg::Select);
                assert_eq!(query, "age_gte=18");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_access_command() {
        let config = CliConfig::try_parse_from([
            "taskdesk",
            "access",
            "--graph",
            "graph.json",
            "--user",
            "alice",
            "--permission",
            "read|update",
            "--resource",
            "role_type",
        ])
        .unwrap();

        match config.command {
            Command::Access {
                user,
                permission,
                resource,
                group,
                ..
            } => {
                assert_eq!(user, UserId::new("alice"));
                assert_eq!(permission, Permission::READ | Permission::UPDATE);
                assert_eq!(resource, Resource::RoleType);
                assert!(group.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_permission() {
        let result = CliConfig::try_parse_from([
            "taskdesk",
            "access",
            "--graph",
            "g.json",
            "--user",
            "u",
            "--permission",
            "fly",
            "--resource",
            "task",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_page_sizes() {
        let mut config = CliConfig::try_parse_from([
            "taskdesk", "plan", "--schema", "s.json", "x_eq=1",
        ])
        .unwrap();
        assert!(config.validate().is_ok());

        config.default_page_size = 100;
        config.max_page_size = Some(10);
        assert!(config.validate().is_err());
    }
}
