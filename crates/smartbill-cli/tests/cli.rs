use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object};
use predicates::prelude::*;
use tempfile::TempDir;

/// Temp workspace with a config file pointing the store and models inside it.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = serde_json::json!({
            "ocr": { "enabled": true, "model_dir": dir.path().join("models") },
            "store": { "path": dir.path().join("bills.csv") },
        });
        fs::write(dir.path().join("config.json"), config.to_string()).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("smartbill").unwrap();
        cmd.arg("--config").arg(self.path("config.json"));
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn write_text_pdf(path: &Path, line: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("smartbill")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_process_missing_input_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["process", "--text-only"])
        .arg(ws.path("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unsupported_extension_fails() {
    let ws = Workspace::new();
    let input = ws.path("notes.txt");
    fs::write(&input, "Total 12.00").unwrap();

    ws.cmd()
        .args(["process", "--text-only"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_missing_models_are_fatal_without_text_only() {
    let ws = Workspace::new();
    let input = ws.path("bill.pdf");
    write_text_pdf(&input, "Total: 156.99 due March 15, 2025");

    ws.cmd()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load OCR models"));
}

#[test]
fn test_process_digital_pdf() {
    let ws = Workspace::new();
    let input = ws.path("bill.pdf");
    write_text_pdf(&input, "Total: 156.99 due March 15, 2025");

    let output = ws
        .cmd()
        .args(["process", "--text-only"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        record,
        serde_json::json!({
            "type": "Unknown",
            "amount": 156.99,
            "due_date": "2025-03-15",
            "source_file_name": "bill.pdf",
        })
    );
}

#[test]
fn test_unreadable_file_yields_zeroed_record() {
    let ws = Workspace::new();
    let input = ws.path("broken.png");
    fs::write(&input, b"definitely not a png").unwrap();

    let output = ws
        .cmd()
        .args(["process", "--text-only", "--show-warnings"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["amount"], 0.0);
    assert_eq!(record["due_date"], serde_json::Value::Null);
    assert!(String::from_utf8_lossy(&output.stderr).contains("unreadable document"));
}

#[test]
fn test_save_then_list_and_query() {
    let ws = Workspace::new();
    let input = ws.path("bill.pdf");
    write_text_pdf(&input, "Total: 156.99 due March 15, 2025");

    ws.cmd()
        .args(["process", "--text-only", "--save", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount:   156.99"));

    assert!(ws.path("bills.csv").exists());

    ws.cmd()
        .args(["list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("type,amount,due_date,source_file_name"))
        .stdout(predicate::str::contains("Unknown,156.99,2025-03-15,bill.pdf"));

    ws.cmd()
        .args(["query", "give me a summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Here is your monthly bill summary by type."))
        .stdout(predicate::str::contains("Unknown"));
}

#[test]
fn test_query_on_empty_store() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["query", "what is due this month?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have 0 bills due this month, totaling 0.00"));

    ws.cmd()
        .args(["query", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorry, I couldn't understand the query."));
}

#[test]
fn test_batch_keeps_input_order() {
    let ws = Workspace::new();
    let docs = ws.path("docs");
    fs::create_dir_all(&docs).unwrap();
    write_text_pdf(&docs.join("a.pdf"), "Amount 10.00");
    fs::write(docs.join("b.pdf"), b"garbage").unwrap();
    write_text_pdf(&docs.join("c.pdf"), "Amount 30.00");

    let output = ws
        .cmd()
        .args(["batch", "--text-only", "-j", "2"])
        .arg(format!("{}/*.pdf", docs.display()))
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let summary: Vec<_> = records
        .iter()
        .map(|r| (r["source_file_name"].as_str().unwrap(), r["amount"].as_f64().unwrap()))
        .collect();
    assert_eq!(summary, vec![("a.pdf", 10.0), ("b.pdf", 0.0), ("c.pdf", 30.0)]);
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let ws = Workspace::new();
    let target = ws.path("new").join("config.json");

    ws.cmd()
        .args(["config", "init", "-o"])
        .arg(&target)
        .assert()
        .success();
    assert!(target.exists());

    ws.cmd()
        .args(["config", "init", "-o"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    ws.cmd()
        .args(["config", "init", "--force", "-o"])
        .arg(&target)
        .assert()
        .success();
}

#[test]
fn test_config_path_reports_given_file() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("exists"));
}
