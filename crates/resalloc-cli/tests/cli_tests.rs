use pretty_assertions::assert_eq;
use resalloc_cli::{command, run, Session};
use resalloc_core::{IssueId, UserId};
use std::io::Write;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r"
departments:
  - { id: 1, name: Engineering }
  - { id: 2, name: Design }
resources:
  - { id: 10, name: Backend, department_id: 1 }
  - { id: 20, name: Designer, department_id: 2 }
members:
  - { id: 1, user_id: 100, project_id: 1, resource_id: 10 }
  - { id: 2, user_id: 200, project_id: 1, resource_id: 20 }
settings:
  - { project_id: 1, setting: 1, object_type: Tracker, object_id: 1 }
issues:
  - { id: 1, tracker_id: 1, project_id: 1, estimated_hours: 6.0 }
  - { id: 2, parent_id: 1, tracker_id: 1, project_id: 1, assigned_to_id: 100, estimated_hours: 3.0 }
  - { id: 3, parent_id: 1, tracker_id: 1, project_id: 1, assigned_to_id: 100, estimated_hours: 2.0 }
  - { id: 4, parent_id: 1, tracker_id: 1, project_id: 1, assigned_to_id: 200, estimated_hours: 1.0 }
  - { id: 5, parent_id: 1, tracker_id: 1, project_id: 1 }
issue_resources:
  - { id: 1, issue_id: 1, resource_id: 10, estimation: 5.0 }
  - { id: 2, issue_id: 1, resource_id: 20, estimation: 1.0 }
";

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let matches = command().try_get_matches_from(args).unwrap();
    run(&matches)
}

#[test]
fn estimate_reports_journal_and_tables() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let session = Session::open(snapshot.path(), None).unwrap();

    let output = session.estimate(IssueId(2), 5.0, None, true).unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(report["journal"][0]["mode"], "update");
    assert_eq!(report["journal"][0]["old_value"], 5.0);
    assert_eq!(report["journal"][0]["new_value"], 7.0);
    assert_eq!(report["snapshot"]["issue_resources"][0]["estimation"], 7.0);
    assert_eq!(report["snapshot"]["issues"][0]["estimated_hours"], 3.0);
}

#[test]
fn estimate_text_output() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();

    let output = run_args(&[
        "resalloc", "estimate", "--snapshot", path, "--issue", "2", "--hours", "5",
    ])
    .unwrap();

    assert!(output.contains("resource_estimation resource=10 update: 5 -> 7"));
    assert!(output.contains("snapshot:\n"));
}

#[test]
fn acting_user_resolves_unassigned_issue() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let session = Session::open(snapshot.path(), None).unwrap();

    let output = session
        .estimate(IssueId(5), 4.0, Some(UserId(200)), true)
        .unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(report["journal"][0]["resource_id"], 20);
    assert_eq!(report["journal"][0]["new_value"], 5.0);
}

#[test]
fn groups_by_department() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let session = Session::open(snapshot.path(), None).unwrap();

    assert_eq!(
        session.groups(IssueId(1), false).unwrap(),
        "Engineering:\n  resource 10: 5\nDesign:\n  resource 20: 1\n"
    );
    let json: serde_json::Value =
        serde_json::from_str(&session.groups(IssueId(1), true).unwrap()).unwrap();
    assert_eq!(json["Design"][0]["estimation"], 1.0);
}

#[test]
fn total_sums_children() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();

    let output = run_args(&["resalloc", "total", "--snapshot", path, "--issue", "1"]).unwrap();
    assert_eq!(output, "6\n");
}

#[test]
fn config_file_is_validated() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let config = write_temp(".yaml", "max_depth: 0\n");

    let err = Session::open(snapshot.path(), Some(config.path())).unwrap_err();
    assert!(format!("{err:#}").contains("max_depth"));
}

#[test]
fn unknown_issue_is_an_error() {
    let snapshot = write_temp(".yaml", SNAPSHOT);
    let session = Session::open(snapshot.path(), None).unwrap();

    let err = session.estimate(IssueId(42), 1.0, None, false).unwrap_err();
    assert_eq!(err.to_string(), "issue 42 not found in snapshot");
}

#[test]
fn unreadable_snapshot_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    let err = Session::open(&missing, None).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}
