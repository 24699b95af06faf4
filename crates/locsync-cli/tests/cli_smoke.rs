use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const REFERENCE: &str = "en.default.json";

fn run_locsync<I, S>(cwd: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_locsync");
    Command::new(bin)
        .current_dir(cwd)
        .env_remove("LOCSYNC_LOG")
        .args(args)
        .output()
        .expect("locsync command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_status(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
}

/// Project layout: `locales/` with a reference, two targets, and nothing
/// else.
fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let locales = dir.path().join("locales");
    fs::create_dir_all(&locales).expect("locales dir");
    fs::write(
        locales.join(REFERENCE),
        "{\n  // reference\n  \"a\": {\"b\": \"Hello\", \"c\": \"World\",},\n  \"x\": \"1\"\n}\n",
    )
    .expect("reference");
    fs::write(locales.join("fr.json"), r#"{"a": {"b": ""}, "w": "extra"}"#).expect("fr");
    fs::write(
        locales.join("de.json"),
        r#"{"a": {"b": "Hallo", "c": "Welt"}, "x": "eins"}"#,
    )
    .expect("de");
    dir
}

#[test]
fn diff_json_reports_drift_and_exits_two() {
    let dir = project();
    let output = run_locsync(dir.path(), ["diff", "--json"]);
    assert_status(&output, 2);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["schema"], 1);
    assert_eq!(payload["kind"], "locsync.diff.v1");
    assert!(payload["generatedAt"].is_string());
    assert_eq!(payload["drift"], true);

    let rows = payload["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["file"], "de.json");
    assert_eq!(rows[0]["missingCount"], 0);
    assert_eq!(rows[1]["file"], "fr.json");
    assert_eq!(rows[1]["missingKeys"], serde_json::json!(["a.c", "x"]));
    assert_eq!(rows[1]["extraKeys"], serde_json::json!(["w"]));

    let report: Value =
        serde_json::from_str(&read(dir.path(), "locale_key_report.json")).expect("report json");
    assert_eq!(report.as_array().map(Vec::len), Some(2));
}

#[test]
fn diff_allow_drift_exits_zero() {
    let dir = project();
    let output = run_locsync(dir.path(), ["diff", "--allow-drift"]);
    assert_success(&output);
}

#[test]
fn fill_backs_up_writes_and_exports_csv() {
    let dir = project();
    let output = run_locsync(dir.path(), ["fill"]);
    assert_success(&output);

    assert_eq!(
        read(dir.path(), "locales/fr.json"),
        "{\n  \"a\": {\n    \"b\": \"\",\n    \"c\": \"World\"\n  },\n  \"w\": \"extra\",\n  \"x\": \"1\"\n}\n"
    );
    assert_eq!(
        read(dir.path(), "locales/fr.json.bak"),
        r#"{"a": {"b": ""}, "w": "extra"}"#
    );
    assert!(!dir.path().join("locales/de.json.bak").exists());
    assert_eq!(
        read(dir.path(), "i18n-missing-export.csv"),
        "key,en,locale,translation\n\"a.c\",\"World\",\"fr\",\"\"\n\"x\",\"1\",\"fr\",\"\"\n"
    );

    let again = run_locsync(dir.path(), ["fill", "--json"]);
    assert_success(&again);
    let payload = parse_json_stdout(&again);
    assert_eq!(payload["rows"], serde_json::json!([]));
}

#[test]
fn fill_dry_run_writes_nothing() {
    let dir = project();
    let output = run_locsync(dir.path(), ["fill", "--dry-run"]);
    assert_success(&output);
    assert_eq!(
        read(dir.path(), "locales/fr.json"),
        r#"{"a": {"b": ""}, "w": "extra"}"#
    );
    assert!(!dir.path().join("i18n-missing-export.csv").exists());
}

#[test]
fn rebuild_writes_synced_siblings_and_summary() {
    let dir = project();
    let output = run_locsync(dir.path(), ["rebuild"]);
    assert_success(&output);

    assert_eq!(
        read(dir.path(), "locales/fr.synced.json"),
        "{\n  \"a\": {\n    \"b\": \"\",\n    \"c\": \"World\"\n  },\n  \"x\": \"1\"\n}\n"
    );
    assert_eq!(
        read(dir.path(), "locales/fr.json"),
        r#"{"a": {"b": ""}, "w": "extra"}"#
    );
    let summary: Value =
        serde_json::from_str(&read(dir.path(), "sync_summary.json")).expect("summary json");
    assert_eq!(
        summary,
        serde_json::json!({"produced": ["de.synced.json", "fr.synced.json"], "invalid": []})
    );
}

#[test]
fn unparseable_target_exits_two_but_others_are_processed() {
    let dir = project();
    fs::write(dir.path().join("locales/it.json"), "{ \"a\": ").expect("it");
    let output = run_locsync(dir.path(), ["rebuild", "--in-place", "--json"]);
    assert_status(&output, 2);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["invalid"][0]["file"], "it.json");
    assert!(read(dir.path(), "locales/fr.json").contains("\"c\": \"World\""));
    assert!(dir.path().join("locales/fr.json.bak").exists());
}

#[test]
fn missing_reference_exits_one_without_touching_targets() {
    let dir = project();
    fs::remove_file(dir.path().join("locales").join(REFERENCE)).expect("remove reference");
    let output = run_locsync(dir.path(), ["fill"]);
    assert_status(&output, 1);
    assert_eq!(
        read(dir.path(), "locales/fr.json"),
        r#"{"a": {"b": ""}, "w": "extra"}"#
    );
}

#[test]
fn promote_fills_reference_gaps_from_donor() {
    let dir = project();
    fs::write(
        dir.path().join("locales").join(REFERENCE),
        r#"{"a": {"b": "Hello", "c": ""}}"#,
    )
    .expect("reference");
    let output = run_locsync(dir.path(), ["promote", "--donor", "de.json", "--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["run"]["outcome"]["filled"][0]["path"], "a.c");
    assert_eq!(
        read(dir.path(), "locales/en.default.json"),
        "{\n  \"a\": {\n    \"b\": \"Hello\",\n    \"c\": \"Welt\"\n  },\n  \"x\": \"eins\"\n}\n"
    );
    assert!(dir.path().join("locales/en.default.json.bak").exists());
    assert_eq!(
        read(dir.path(), "i18n-promoted.csv"),
        "key,en,locale,translation\n\"a.c\",\"Welt\",\"en\",\"\"\n\"x\",\"eins\",\"en\",\"\"\n"
    );
    assert_eq!(payload["rows"][1]["keyPath"], "x");
}

#[test]
fn promote_export_flag_and_dry_run() {
    let dir = project();
    fs::write(
        dir.path().join("locales").join(REFERENCE),
        r#"{"a": {"b": "", "c": "World"}}"#,
    )
    .expect("reference");

    let dry = run_locsync(dir.path(), ["promote", "--donor", "de.json", "--dry-run"]);
    assert_success(&dry);
    assert!(!dir.path().join("i18n-promoted.csv").exists());

    let output = run_locsync(
        dir.path(),
        ["promote", "--donor", "de.json", "--export", "healed.csv"],
    );
    assert_success(&output);
    assert_eq!(
        read(dir.path(), "healed.csv"),
        "key,en,locale,translation\n\"a.b\",\"Hallo\",\"en\",\"\"\n\"x\",\"eins\",\"en\",\"\"\n"
    );
}

#[test]
fn selfrefs_repairs_placeholders() {
    let dir = project();
    fs::write(
        dir.path().join("locales").join(REFERENCE),
        r#"{"general": {"cart": {"title": "general.cart.title"}}}"#,
    )
    .expect("reference");
    let output = run_locsync(dir.path(), ["selfrefs"]);
    assert_success(&output);
    assert!(read(dir.path(), "locales/en.default.json").contains("\"title\": \"Title\""));
}

#[test]
fn stats_and_empty_cover_every_catalog() {
    let dir = project();
    let stats = run_locsync(dir.path(), ["stats", "--json"]);
    assert_success(&stats);
    let payload = parse_json_stdout(&stats);
    let catalogs = payload["catalogs"].as_array().expect("catalogs");
    assert_eq!(catalogs.len(), 3);
    let fr = catalogs
        .iter()
        .find(|c| c["name"] == "fr.json")
        .expect("fr stats");
    assert_eq!(fr["totalKeys"], 3);
    assert_eq!(fr["presentKeys"], 1);
    assert_eq!(fr["emptyKeys"], 1);

    let empty = run_locsync(dir.path(), ["empty"]);
    assert_success(&empty);
    assert_eq!(
        read(dir.path(), "i18n-empty-strings.csv"),
        "locale,key\nfr,\"a.b\"\n"
    );
}

#[test]
fn pending_lists_blank_translations() {
    let dir = project();
    let output = run_locsync(dir.path(), ["pending", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["rows"],
        serde_json::json!([{"keyPath": "a.b", "referenceValue": "Hello", "locale": "fr"}])
    );
    assert!(dir.path().join("i18n-pending.csv").exists());
}

#[test]
fn declare_adds_keys_to_reference() {
    let dir = project();
    fs::write(dir.path().join("keys.txt"), "'a.d'\nnew.key\n\na.b\n").expect("keys");
    let output = run_locsync(dir.path(), ["declare", "keys.txt", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["requested"], 3);
    assert_eq!(payload["run"]["outcome"], serde_json::json!(["a.d", "new.key"]));
    let reference = read(dir.path(), "locales/en.default.json");
    assert!(reference.contains("\"d\": \"\""));
    assert!(reference.contains("\"b\": \"Hello\""));
}

#[test]
fn seed_uses_locale_value_or_fallback() {
    let dir = project();
    fs::write(
        dir.path().join("locsync.toml"),
        r#"
[[seed.entries]]
key = "custom.ref_variant_label"
values = { en = "Linked variant reference", fr = "Référence variante liée" }
"#,
    )
    .expect("config");
    let output = run_locsync(dir.path(), ["seed"]);
    assert_success(&output);
    assert!(read(dir.path(), "locales/fr.json").contains("Référence variante liée"));
    assert!(read(dir.path(), "locales/de.json").contains("Linked variant reference"));
    assert!(read(dir.path(), "locales/en.default.json").contains("Linked variant reference"));
}

#[test]
fn init_creates_blank_skeleton_once() {
    let dir = project();
    let output = run_locsync(dir.path(), ["init", "sv", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["keys"], 3);
    assert_eq!(
        read(dir.path(), "locales/sv.json"),
        "{\n  \"a\": {\n    \"b\": \"\",\n    \"c\": \"\"\n  },\n  \"x\": \"\"\n}\n"
    );

    let again = run_locsync(dir.path(), ["init", "sv"]);
    assert_status(&again, 1);
}

#[test]
fn global_flags_override_locations() {
    let dir = project();
    fs::rename(dir.path().join("locales"), dir.path().join("i18n")).expect("rename");
    let output = run_locsync(
        dir.path(),
        ["stats", "--locales", "i18n", "--reference", REFERENCE],
    );
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("fr.json: keys=3"));
}
