//! # scopectl
//!
//! Command-line front end for the scope checkers.
//!
//! Roles, scopes and the organization tree come from a JSON fixture; the
//! candidates to check come from a JSON request file. Results are printed
//! as JSON on stdout.
//!
//! ## Fixture
//!
//! ```json
//! {
//!   "roles": [{ "id": 1, "name": "ops", "type": "rating_manager" }],
//!   "auth_scopes": { "1": [{ "system_id": "cmdb", "actions": [] }] },
//!   "subject_scopes": { "1": [{ "type": "department", "id": "a" }] },
//!   "departments": [{ "id": "a", "ancestor_ids": ["root"] }],
//!   "members": { "alice": ["a"] }
//! }
//! ```
//!
//! ## Configuration
//!
//! - `--config` - TOML checker configuration (defaults apply when omitted)
//! - `RUST_LOG` - Log filter (default: `log_level` from the configuration)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iamscope_authz::{
    AuthScopeChecker, AuthzError, CachedOrganizationResolver, CheckerConfig, InMemoryOrganization,
    InMemoryScopeStore, SubjectScopeChecker, ViolationMode,
};
use iamscope_core::{AuthScope, Department, DepartmentId, PathNode, Policy, Role, RoleId, Subject, Username};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Scope containment checks for delegated permission management
#[derive(Parser)]
#[command(name = "scopectl")]
#[command(version)]
struct Cli {
    /// Path to the checker configuration file
    #[arg(short, long, env = "SCOPECTL_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the JSON fixture with roles, scopes and the organization tree
    #[arg(short, long, env = "SCOPECTL_FIXTURE")]
    fixture: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that every policy of the request lies inside the role's scope
    CheckPolicies {
        #[arg(long)]
        role: RoleId,
        #[arg(long)]
        system: String,
        /// JSON array of policies
        #[arg(long)]
        request: PathBuf,
    },

    /// List the policies of the request that exceed the role's scope
    NotMatchPolicies {
        #[arg(long)]
        role: RoleId,
        #[arg(long)]
        system: String,
        /// JSON array of policies
        #[arg(long)]
        request: PathBuf,
    },

    /// Check subjects against the role's subject scope
    CheckSubjects {
        #[arg(long)]
        role: RoleId,
        /// JSON array of subjects
        #[arg(long)]
        request: PathBuf,
        /// Drop violating subjects instead of failing
        #[arg(long)]
        exclude: bool,
    },

    /// Keep the resource paths that lie inside the scope of an action
    FilterPaths {
        #[arg(long)]
        role: RoleId,
        #[arg(long)]
        system: String,
        #[arg(long)]
        action: String,
        /// JSON array of paths
        #[arg(long)]
        request: PathBuf,
    },
}

/// Everything the in-memory collaborators are seeded with
#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    auth_scopes: HashMap<RoleId, AuthScope>,
    #[serde(default)]
    subject_scopes: HashMap<RoleId, Vec<Subject>>,
    #[serde(default)]
    departments: Vec<Department>,
    #[serde(default)]
    members: HashMap<Username, Vec<DepartmentId>>,
}

impl Fixture {
    fn role(&self, id: RoleId) -> Result<&Role> {
        self.roles
            .iter()
            .find(|r| r.id == id)
            .with_context(|| format!("role {} is not defined in the fixture", id))
    }

    async fn store(&self) -> InMemoryScopeStore {
        let store = InMemoryScopeStore::new();
        for (role_id, scope) in &self.auth_scopes {
            store.set_auth_scope(*role_id, scope.clone()).await;
        }
        for (role_id, subjects) in &self.subject_scopes {
            store.set_subject_scope(*role_id, subjects.clone()).await;
        }
        store
    }

    fn organization(&self) -> InMemoryOrganization {
        let mut org = InMemoryOrganization::new();
        for department in &self.departments {
            org = org.with_department(department.clone());
        }
        for (username, department_ids) in &self.members {
            for department_id in department_ids {
                org = org.with_member(username.clone(), department_id.clone());
            }
        }
        org
    }
}

/// Outcome of a raising check
#[derive(Debug, Serialize)]
struct Verdict<T: Serialize> {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

impl<T: Serialize> Verdict<T> {
    /// Forbidden decisions become a verdict; other errors abort the command
    fn from_outcome(outcome: std::result::Result<T, AuthzError>) -> Result<Self> {
        match outcome {
            Ok(result) => Ok(Self {
                allowed: true,
                reason: None,
                result: Some(result),
            }),
            Err(e) if e.is_forbidden() => Ok(Self {
                allowed: false,
                reason: Some(e.to_string()),
                result: None,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} from {}", what, path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CheckerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CheckerConfig::default(),
    };

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let fixture: Fixture = read_json(&cli.fixture, "fixture")?;
    info!(
        "Loaded fixture with {} roles and {} departments",
        fixture.roles.len(),
        fixture.departments.len()
    );
    let store = fixture.store().await;

    match cli.command {
        Command::CheckPolicies { role, system, request } => {
            let role = fixture.role(role)?;
            let policies: Vec<Policy> = read_json(&request, "policies")?;

            let outcome = AuthScopeChecker::load(role, &store, &config)
                .await
                .and_then(|checker| checker.check_policies(&system, &policies));
            print_json(&Verdict::from_outcome(outcome)?)?;
        }

        Command::NotMatchPolicies { role, system, request } => {
            let role = fixture.role(role)?;
            let policies: Vec<Policy> = read_json(&request, "policies")?;

            let checker = AuthScopeChecker::load(role, &store, &config).await?;
            let not_matched = checker.list_not_match_policies(&system, &policies);
            debug!("{} of {} policies exceed the scope", not_matched.len(), policies.len());
            print_json(&not_matched)?;
        }

        Command::CheckSubjects { role, request, exclude } => {
            let role = fixture.role(role)?;
            let subjects: Vec<Subject> = read_json(&request, "subjects")?;
            let resolver = Arc::new(CachedOrganizationResolver::with_ttl(
                fixture.organization(),
                config.hierarchy_cache_ttl(),
            ));
            let mode = if exclude { ViolationMode::Exclude } else { ViolationMode::Raise };

            let outcome = match SubjectScopeChecker::load(role, &store, resolver, &config).await {
                Ok(checker) => checker.check(subjects, mode).await,
                Err(e) => Err(e),
            };
            print_json(&Verdict::from_outcome(outcome)?)?;
        }

        Command::FilterPaths { role, system, action, request } => {
            let role = fixture.role(role)?;
            let paths: Vec<Vec<PathNode>> = read_json(&request, "paths")?;

            let checker = AuthScopeChecker::load(role, &store, &config).await?;
            let kept = checker.remove_path_outside_scope(&system, &action, paths)?;
            print_json(&kept)?;
        }
    }

    Ok(())
}
