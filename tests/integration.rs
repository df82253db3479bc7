use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn glosa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("glosa");
    path
}

const EXPORT_JSON: &str = r#"[
  {
    "subject": "Jn 1, 10-18",
    "from": "booster@atlas.cz",
    "body": "Přeposláno\nKopie:\nSlovo se stalo tělem\n(Jn 1,10-18)\nNa počátku bylo Slovo.\nTo Slovo bylo u Boha.",
    "date": "2021-12-24T08:00:00Z"
  },
  {
    "subject": "Lk 3, 10-18",
    "from": "booster@atlas.cz",
    "body": "Co máme dělat?\n(Lk 3,10-18)\nZástupy se ptaly Jana Křtitele, co mají dělat.",
    "date": "2021-12-12T08:00:00Z"
  },
  {
    "subject": "Mt 5,1-12",
    "from": "jiny@priklad.cz",
    "body": "Blahoslavenství\n(Mt 5,1-12)\nBlaze chudým v duchu, neboť jejich je nebeské království."
  },
  {
    "subject": "FW: pozdrav z hor",
    "from": "booster@atlas.cz",
    "body": "Ahoj,\nposílám pozdrav.\nMěj se."
  },
  {
    "subject": "Mk 1,1-8",
    "from": "booster@atlas.cz",
    "body": "jen jeden řádek"
  }
]"#;

const HTML_PAGE: &str = r#"<html><body>
  <div>
    <h3 class="block_7">Třetí neděle adventní</h3>
    <h4>Co máme dělat?</h4>
    <p class="block_"><i>Lk</i> 3, 10 – 18</p>
    <p>Zástupy se ptaly Jana Křtitele.</p>
    <p>Kdo má dvoje oblečení, ať se rozdělí s tím, kdo nemá žádné.</p>
  </div>
  <div>
    <h3 class="block_7">Druhá neděle adventní</h3>
    <p class="block_"><i>Mk</i> 1,1-8</p>
    <p>Začátek evangelia o Ježíši Kristu.</p>
  </div>
</body></html>"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("export.json"), EXPORT_JSON).unwrap();
    fs::write(data_dir.join("page.html"), HTML_PAGE).unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/glosa.sqlite"

[server]
bind = "127.0.0.1:7411"

[ingest]
language = "sk"
min_body_lines = 2

[connectors.json]
path = "{root}/data/export.json"

[connectors.html]
path = "{root}/data/page.html"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("glosa.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_glosa(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = glosa_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run glosa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_glosa(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("glosa.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_glosa(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_glosa(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_sources() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_glosa(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("json"));
    assert!(stdout.contains("html"));
    assert!(stdout.contains("OK"));
}

#[test]
fn test_import_json_reports_imports_and_skips() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout, stderr, success) = run_glosa(&config_path, &["import", "json"]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("items scanned: 5"), "got: {}", stdout);
    assert!(stdout.contains("imported: 3"), "got: {}", stdout);
    assert!(stdout.contains("skipped: 2"), "got: {}", stdout);
    assert!(stdout.contains("no reference found"), "got: {}", stdout);
    assert!(stdout.contains("too short"), "got: {}", stdout);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_import_twice_skips_duplicates() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout1, _, _) = run_glosa(&config_path, &["import", "json"]);
    assert!(stdout1.contains("imported: 3"));

    let (stdout2, _, success) = run_glosa(&config_path, &["import", "json"]);
    assert!(success, "second import should succeed: {}", stdout2);
    assert!(stdout2.contains("imported: 0"), "got: {}", stdout2);
    assert!(
        stdout2.contains("duplicate content hash"),
        "got: {}",
        stdout2
    );
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout, _, success) = run_glosa(&config_path, &["import", "json", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("items scanned: 5"));
    assert!(stdout.contains("candidates: 3"));

    // A real import afterwards still finds everything new.
    let (stdout, _, _) = run_glosa(&config_path, &["import", "json"]);
    assert!(stdout.contains("imported: 3"), "got: {}", stdout);
}

#[test]
fn test_import_with_limit() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout, _, success) = run_glosa(&config_path, &["import", "json", "--limit", "1"]);
    assert!(success);
    assert!(stdout.contains("imported: 1"), "got: {}", stdout);
}

#[test]
fn test_unknown_connector() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (_, stderr, success) = run_glosa(&config_path, &["import", "mailbox"]);
    assert!(!success, "Unknown connector should fail");
    assert!(stderr.contains("Unknown connector"));
}

#[test]
fn test_import_html() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout, stderr, success) = run_glosa(&config_path, &["import", "html"]);
    assert!(success, "html import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("imported: 2"), "got: {}", stdout);
    assert!(stdout.contains("skipped: 0"), "got: {}", stdout);

    // The en-dash citation parsed into a proper range.
    let (stdout, _, _) = run_glosa(&config_path, &["range", "Lk 3,12-14"]);
    assert!(stdout.contains("Lk 3:10-18"), "got: {}", stdout);
}

#[test]
fn test_search_finds_comment_text() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    run_glosa(&config_path, &["import", "json"]);

    let (stdout, _, success) = run_glosa(&config_path, &["search", "Zástupy"]);
    assert!(success, "search failed");
    assert!(stdout.contains("Lk 3:10-18"), "got: {}", stdout);
    assert!(stdout.contains("obohu.cz"), "got: {}", stdout);
}

#[test]
fn test_search_author_filter() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    run_glosa(&config_path, &["import", "json"]);

    let (stdout, _, _) = run_glosa(
        &config_path,
        &["search", "neboť", "--author", "booster"],
    );
    assert!(stdout.contains("No results"), "got: {}", stdout);

    let (stdout, _, _) = run_glosa(&config_path, &["search", "neboť", "--author", "jiny"]);
    assert!(stdout.contains("Mt 5:1-12"), "got: {}", stdout);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    run_glosa(&config_path, &["import", "json"]);

    let (stdout, _, success) = run_glosa(&config_path, &["search", "xyznonexistent"]);
    assert!(success);
    assert!(stdout.contains("No results"));
}

#[test]
fn test_range_overlap_semantics() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    run_glosa(&config_path, &["import", "json"]);

    // Jn 1,10-18 overlaps 12-13; Lk and Mt records are other books.
    let (stdout, _, success) = run_glosa(&config_path, &["range", "Jn 1,12-13"]);
    assert!(success);
    assert!(stdout.contains("Jn 1:10-18"), "got: {}", stdout);
    assert!(!stdout.contains("Lk"), "got: {}", stdout);

    // Non-overlapping verse window.
    let (stdout, _, _) = run_glosa(&config_path, &["range", "Jn 1,20-25"]);
    assert!(stdout.contains("No results"), "got: {}", stdout);

    // A bare book + chapter scans the whole chapter.
    let (stdout, _, success) = run_glosa(&config_path, &["range", "Jn 1"]);
    assert!(success);
    assert!(stdout.contains("Jn 1:10-18"), "got: {}", stdout);
}

#[test]
fn test_range_invalid_reference_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (_, stderr, success) = run_glosa(&config_path, &["range", "totally invalid"]);
    assert!(!success);
    assert!(stderr.contains("unparsable reference"), "got: {}", stderr);
}

#[test]
fn test_add_then_range() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);
    let (stdout, stderr, success) = run_glosa(
        &config_path,
        &["add", "J 2,1-11", "Svatba v Káně Galilejské.", "--author", "rukopis"],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Saved J 2:1-11"), "got: {}", stdout);

    // Adding the identical pair again is a silent skip.
    let (stdout, _, success) = run_glosa(
        &config_path,
        &["add", "J 2,1-11", "Svatba v Káně Galilejské.", "--author", "rukopis"],
    );
    assert!(success);
    assert!(stdout.contains("already stored"), "got: {}", stdout);

    let (stdout, _, _) = run_glosa(&config_path, &["range", "J 2,5-6"]);
    assert!(stdout.contains("J 2:1-11"), "got: {}", stdout);
}

/// Kills the server child process when the test ends, pass or fail.
struct ChildGuard(std::process::Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn test_server_endpoints() {
    let (_tmp, config_path) = setup_test_env();

    run_glosa(&config_path, &["init"]);

    let child = Command::new(glosa_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("failed to spawn glosa serve");
    let _guard = ChildGuard(child);

    let base = "http://127.0.0.1:7411";
    let client = reqwest::blocking::Client::new();

    // Wait for the server to come up.
    let mut healthy = false;
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{}/health", base)).send() {
            if resp.status().is_success() {
                healthy = true;
                break;
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    assert!(healthy, "server did not become healthy");

    // First add stores the record.
    let body = serde_json::json!({
        "reference": "Jn 1, 10-18",
        "comment": "Slovo se stalo tělem a přebývalo mezi námi.",
        "author": "web",
    });
    let resp = client
        .post(format!("{}/comments", base))
        .json(&body)
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let added: serde_json::Value = resp.json().unwrap();
    assert_eq!(added["duplicate"], false);
    assert_eq!(added["saved"]["book"], "Jn");
    assert_eq!(added["saved"]["verse_from"], 10);
    assert_eq!(added["saved"]["verse_to"], 18);

    // Posting the identical pair again flags the duplicate.
    let resp = client
        .post(format!("{}/comments", base))
        .json(&body)
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let again: serde_json::Value = resp.json().unwrap();
    assert_eq!(again["duplicate"], true);

    // Range lookup finds the overlapping record.
    let resp = client
        .get(format!("{}/range", base))
        .query(&[("ref", "Jn 1,12-13")])
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let hits: serde_json::Value = resp.json().unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["book"], "Jn");

    // Chapter-only lookup works without verse bounds.
    let resp = client
        .get(format!("{}/range", base))
        .query(&[("ref", "Jn 1")])
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let hits: serde_json::Value = resp.json().unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Full-text search hits the comment body.
    let resp = client
        .get(format!("{}/search", base))
        .query(&[("q", "přebývalo")])
        .send()
        .unwrap();
    assert!(resp.status().is_success());
    let hits: serde_json::Value = resp.json().unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Missing query parameter is a 400 with the JSON error shape.
    let resp = client.get(format!("{}/search", base)).send().unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let err: serde_json::Value = resp.json().unwrap();
    assert_eq!(err["error"]["code"], "bad_request");

    // Unparsable citation is a 400, not a 500.
    let resp = client
        .get(format!("{}/range", base))
        .query(&[("ref", "totally invalid")])
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[test]
fn test_end_to_end_three_line_message() {
    let (tmp, config_path) = setup_test_env();

    // Single message, subject carries the citation, body has exactly three
    // non-empty lines: title, restated reference, commentary.
    let scenario = r#"[
      {
        "subject": "Jn 1, 10-18",
        "from": "booster@atlas.cz",
        "body": "Slovo se stalo tělem\n(Jn 1,10-18)\nNa počátku bylo Slovo."
      }
    ]"#;
    fs::write(tmp.path().join("data").join("export.json"), scenario).unwrap();

    run_glosa(&config_path, &["init"]);
    let (stdout, _, success) = run_glosa(&config_path, &["import", "json"]);
    assert!(success);
    assert!(stdout.contains("imported: 1"), "got: {}", stdout);
    assert!(stdout.contains("skipped: 0"), "got: {}", stdout);

    let (stdout, _, _) = run_glosa(&config_path, &["range", "Jn 1,10-18"]);
    assert!(stdout.contains("Jn 1:10-18"), "got: {}", stdout);
    assert!(
        stdout.contains("Slovo se stalo tělem"),
        "title should come from the first body line, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Na počátku bylo Slovo."),
        "comment should come from the third body line, got: {}",
        stdout
    );
}
