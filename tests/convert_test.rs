//! Integration tests for the conversion pipeline.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use pdfdraft::convert::{BatchReport, ConvertOptions, Converter, ItemStatus, JsonFormat};
use pdfdraft::error::{Error, Result};
use pdfdraft::extract::{ExtractionChain, TextSource};

/// Returns text keyed on the file name; `broken*` files fail.
struct ByName;

impl TextSource for ByName {
    fn name(&self) -> &str {
        "by-name"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.starts_with("broken") {
            return Err(Error::PdfParse("trailer not found".into()));
        }
        Ok(format!(
            "\n\n--- Page 1 ---\nABSTRACT\nAbout {}.\nREFERENCES\n1. First entry.\n",
            stem
        ))
    }
}

fn converter(output_dir: &Path, parallel: bool) -> Converter {
    Converter::with_options(
        ConvertOptions::new()
            .with_output_dir(output_dir)
            .with_parallel(parallel),
    )
    .with_chain(ExtractionChain::new().with_source(ByName))
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"%PDF-1.4\n").unwrap();
}

#[test]
fn test_single_file_conversion() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "Deep Nets.pdf");

    let outcome = converter(output.path(), true)
        .convert_file(input.path().join("Deep Nets.pdf"))
        .unwrap();

    assert_eq!(outcome.output, output.path().join("Deep Nets.md"));
    assert_eq!(outcome.source, "by-name");
    assert_eq!(outcome.stats.section_headings, 2);
    assert_eq!(outcome.stats.reference_entries, 1);

    let markdown = fs::read_to_string(&outcome.output).unwrap();
    assert!(markdown.starts_with("# Deep Nets\n\n**Source:** Deep Nets.pdf\n**Converted:** "));
    assert!(markdown.contains("\n## Abstract\n\nAbout Deep Nets. \n\n"));
    assert!(markdown.contains("\n## References\n\n\n1. First entry.\n"));
}

#[test]
fn test_output_file_name_is_sanitized() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "CON.pdf");

    let outcome = converter(output.path(), true)
        .convert_file(input.path().join("CON.pdf"))
        .unwrap();
    assert_eq!(outcome.output, output.path().join("CON_.md"));
}

#[test]
fn test_batch_continues_after_failure() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "broken.pdf", "c.PDF", "readme.txt"] {
        touch(input.path(), name);
    }

    for parallel in [true, false] {
        let report = converter(output.path(), parallel)
            .convert_dir(input.path())
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.is_success());

        let names: Vec<_> = report
            .items
            .iter()
            .map(|item| item.input.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "broken.pdf", "c.PDF"]);

        match &report.items[1].status {
            ItemStatus::Failed { message } => assert!(message.contains("trailer not found")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    assert!(output.path().join("a.md").is_file());
    assert!(output.path().join("c.md").is_file());
    assert!(!output.path().join("broken.md").exists());
}

#[test]
fn test_batch_all_failed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "broken-1.pdf");
    touch(input.path(), "broken-2.pdf");

    let report = converter(output.path(), true)
        .convert_dir(input.path())
        .unwrap();
    assert_eq!(report.succeeded(), 0);
    assert!(!report.is_success());
}

#[test]
fn test_batch_colliding_names_get_distinct_outputs() {
    let input = tempfile::tempdir().unwrap();
    for name in ["paper.pdf", "paper?.pdf", "paper|.pdf"] {
        touch(input.path(), name);
    }

    for parallel in [true, false] {
        let output = tempfile::tempdir().unwrap();
        let report = converter(output.path(), parallel)
            .convert_dir(input.path())
            .unwrap();
        assert_eq!(report.succeeded(), 3);

        let outputs: Vec<_> = report.outcomes().map(|o| o.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                output.path().join("paper.md"),
                output.path().join("paper-2.md"),
                output.path().join("paper-3.md"),
            ]
        );

        let first = fs::read_to_string(output.path().join("paper.md")).unwrap();
        let second = fs::read_to_string(output.path().join("paper-2.md")).unwrap();
        let third = fs::read_to_string(output.path().join("paper-3.md")).unwrap();
        assert!(first.contains("About paper. "));
        assert!(second.contains("About paper?. "));
        assert!(third.contains("About paper|. "));
    }
}

#[test]
fn test_batch_ignores_output_name() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "one.pdf");
    touch(input.path(), "two.pdf");

    let converter = Converter::with_options(
        ConvertOptions::new()
            .with_output_dir(output.path())
            .with_output_name("single.md"),
    )
    .with_chain(ExtractionChain::new().with_source(ByName));
    let report = converter.convert_dir(input.path()).unwrap();

    assert_eq!(report.succeeded(), 2);
    assert!(output.path().join("one.md").is_file());
    assert!(output.path().join("two.md").is_file());
    assert!(!output.path().join("single.md").exists());
}

#[test]
fn test_batch_progress_callback() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for name in ["x.pdf", "y.pdf", "broken.pdf"] {
        touch(input.path(), name);
    }

    let seen = Mutex::new(Vec::new());
    converter(output.path(), true)
        .convert_dir_with(input.path(), |item| {
            seen.lock().unwrap().push(item.status.is_converted());
        })
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.iter().filter(|ok| **ok).count(), 2);
}

#[test]
fn test_empty_directory_is_no_documents() {
    let input = tempfile::tempdir().unwrap();
    touch(input.path(), "notes.txt");

    let result = converter(input.path(), true).convert_dir(input.path());
    assert!(matches!(result, Err(Error::NoDocuments(_))));
}

#[test]
fn test_missing_path_is_input_not_found() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("nowhere");

    let converter = converter(output.path(), true);
    assert!(matches!(
        converter.convert_path(&missing),
        Err(Error::InputNotFound(_))
    ));
    assert!(matches!(
        converter.convert_dir(&missing),
        Err(Error::InputNotFound(_))
    ));
}

#[test]
fn test_convert_path_dispatches_on_kind() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "solo.pdf");
    let converter = converter(output.path(), true);

    let single = converter.convert_path(input.path().join("solo.pdf")).unwrap();
    assert_eq!(single.total(), 1);
    assert!(single.is_success());

    let batch = converter.convert_path(input.path()).unwrap();
    assert_eq!(batch.total(), 1);
}

#[test]
fn test_unwritable_output_fails_document() {
    let input = tempfile::tempdir().unwrap();
    touch(input.path(), "paper.pdf");
    let blocker = input.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let result = converter(&blocker, true).convert_file(input.path().join("paper.pdf"));
    match result {
        Err(Error::Persist { path, .. }) => assert_eq!(path, blocker.join("paper.md")),
        other => panic!("expected persist error, got {:?}", other),
    }
}

#[test]
fn test_json_report() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "good.pdf");
    touch(input.path(), "broken.pdf");

    let report = converter(output.path(), false)
        .convert_dir(input.path())
        .unwrap();
    let json = report.to_json(JsonFormat::Pretty).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["status"], "failed");
    assert_eq!(items[1]["status"], "converted");
    assert_eq!(items[1]["stats"]["section_headings"], 2);

    let parsed: BatchReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.succeeded(), 1);
    assert_eq!(parsed.items[1].input, input.path().join("good.pdf"));
}
