//! resalloc command line
//!
//! Replays estimate changes against a snapshot file and prints what the
//! propagator did. The snapshot on disk is never rewritten.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use resalloc_core::{
    IssueId, IssueRepository, Journal, JournalDetail, PropagationConfig, SaveContext, UserId,
};
use resalloc_propagator::{EstimationPropagator, IssueLifecycle};
use resalloc_store::{MemoryStore, Snapshot, SnapshotFormat};
use std::path::Path;
use std::sync::Arc;

fn snapshot_arg() -> Arg {
    Arg::new("snapshot")
        .long("snapshot")
        .required(true)
        .help("Snapshot file (.yaml/.yml or .json)")
}

fn issue_arg() -> Arg {
    Arg::new("issue")
        .long("issue")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Issue id")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Argument definitions for the `resalloc` binary
#[must_use]
pub fn command() -> Command {
    Command::new("resalloc")
        .version(resalloc_core::VERSION)
        .about("Resource estimation propagator")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("YAML propagation config overrides"),
        )
        .subcommand(
            Command::new("estimate")
                .about("Set an issue's estimated hours and show the propagation")
                .arg(snapshot_arg())
                .arg(issue_arg())
                .arg(
                    Arg::new("hours")
                        .long("hours")
                        .required(true)
                        .value_parser(value_parser!(f64))
                        .help("New estimated hours"),
                )
                .arg(
                    Arg::new("as-user")
                        .long("as-user")
                        .value_parser(value_parser!(u64))
                        .help("Acting user for unassigned issues"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("groups")
                .about("Show an issue's estimation rows by department")
                .arg(snapshot_arg())
                .arg(issue_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("total")
                .about("Show an issue's derived total hours")
                .arg(snapshot_arg())
                .arg(issue_arg()),
        )
}

/// Propagator over a store loaded from a snapshot file
#[derive(Debug)]
pub struct Session {
    store: Arc<MemoryStore>,
    lifecycle: IssueLifecycle<MemoryStore>,
}

impl Session {
    /// Load a snapshot and an optional YAML config file
    ///
    /// # Errors
    /// File, parse, or config validation failures.
    pub fn open(snapshot: &Path, config: Option<&Path>) -> Result<Self> {
        let config = match config {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                PropagationConfig::from_yaml_str(&source)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => PropagationConfig::default(),
        };
        let store = Snapshot::read_file(snapshot)
            .and_then(Snapshot::into_store)
            .with_context(|| format!("loading snapshot {}", snapshot.display()))?;
        let store = Arc::new(store);
        let propagator = EstimationPropagator::with_config(Arc::clone(&store), config)?;
        tracing::debug!(snapshot = %snapshot.display(), "session opened");
        Ok(Self {
            store,
            lifecycle: IssueLifecycle::new(propagator),
        })
    }

    /// Save new hours on an issue and report the journal and resulting tables
    ///
    /// # Errors
    /// Unknown issue, propagation, or rendering failures.
    pub fn estimate(
        &self,
        issue_id: IssueId,
        hours: f64,
        acting_user: Option<UserId>,
        json: bool,
    ) -> Result<String> {
        let Some(mut issue) = self.store.issue(issue_id)? else {
            bail!("issue {issue_id} not found in snapshot");
        };
        issue.estimated_hours = Some(hours);

        let mut journal = Journal::new();
        let saved = {
            let mut ctx = SaveContext::new().with_journal(&mut journal);
            ctx.acting_user = acting_user;
            self.lifecycle
                .save(issue, &mut ctx)
                .with_context(|| format!("saving issue {issue_id}"))?
        };
        let snapshot = Snapshot::capture(&self.store);

        if json {
            let report = serde_json::json!({
                "issue": saved,
                "journal": journal.details,
                "snapshot": snapshot,
            });
            return Ok(serde_json::to_string_pretty(&report)?);
        }

        let mut out = format!("issue {issue_id}: estimated hours {}\n", saved.hours());
        out.push_str("journal:\n");
        if journal.is_empty() {
            out.push_str("  (no changes)\n");
        }
        for detail in &journal.details {
            out.push_str(&format!("  {}\n", describe(detail)));
        }
        out.push_str("snapshot:\n");
        out.push_str(&snapshot.render(SnapshotFormat::Yaml)?);
        Ok(out)
    }

    /// Estimation rows of an issue grouped by department
    ///
    /// # Errors
    /// Dangling resource/department references or rendering failures.
    pub fn groups(&self, issue_id: IssueId, json: bool) -> Result<String> {
        let grouped = self
            .lifecycle
            .propagator()
            .resources_with_departments(issue_id)?;
        if json {
            return Ok(serde_json::to_string_pretty(&grouped)?);
        }

        let mut out = String::new();
        for (department, rows) in &grouped {
            out.push_str(&format!("{department}:\n"));
            for row in rows {
                out.push_str(&format!("  resource {}: {}\n", row.resource_id, row.estimation));
            }
        }
        Ok(out)
    }

    /// Derived total hours of an issue
    ///
    /// # Errors
    /// Store failures.
    pub fn total(&self, issue_id: IssueId) -> Result<f64> {
        Ok(self.lifecycle.propagator().total_estimated_hours(issue_id)?)
    }
}

fn describe(detail: &JournalDetail) -> String {
    let value = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "{} resource={} {}: {} -> {}",
        detail.property,
        detail.resource_id,
        detail.mode,
        value(detail.old_value),
        value(detail.new_value)
    )
}

/// Execute parsed arguments and return the text to print
///
/// # Errors
/// Any failure of the selected subcommand.
pub fn run(matches: &ArgMatches) -> Result<String> {
    let Some((name, args)) = matches.subcommand() else {
        bail!("no subcommand given");
    };

    let snapshot = args
        .get_one::<String>("snapshot")
        .context("missing --snapshot")?;
    let config = args.get_one::<String>("config").map(Path::new);
    let issue = IssueId(*args.get_one::<u64>("issue").context("missing --issue")?);
    let session = Session::open(Path::new(snapshot), config)?;

    match name {
        "estimate" => {
            let hours = *args.get_one::<f64>("hours").context("missing --hours")?;
            let acting_user = args.get_one::<u64>("as-user").copied().map(UserId);
            session.estimate(issue, hours, acting_user, args.get_flag("json"))
        }
        "groups" => session.groups(issue, args.get_flag("json")),
        "total" => Ok(format!("{}\n", session.total(issue)?)),
        other => bail!("unknown subcommand {other}"),
    }
}
