//! Command line behaviour of the `imagescaler` binary.

use std::fs;

use assert_cmd::Command;
use image::{ImageBuffer, Rgb};
use predicates::prelude::*;
use tempfile::TempDir;

fn scaler() -> Command {
    Command::cargo_bin("imagescaler").unwrap()
}

#[test]
fn missing_paths_print_usage_without_failing() {
    scaler()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));

    let dir = TempDir::new().unwrap();
    scaler()
        .arg("--input")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn unreadable_input_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    scaler()
        .arg("--input")
        .arg(dir.path().join("does-not-exist"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn resizes_folder_and_prints_json_summary() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for (name, w, h) in [("a.jpg", 90, 30), ("b.jpg", 25, 75)] {
        ImageBuffer::from_pixel(w, h, Rgb([200u8, 100, 50]))
            .save(input.path().join(name))
            .unwrap();
    }
    fs::write(input.path().join("c.jpg"), b"garbage").unwrap();
    fs::write(input.path().join("skip.png"), b"not selected").unwrap();

    let assert = scaler()
        .args(["--width", "40", "--height", "20", "--workers", "2", "--json", "--quiet"])
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["total_eligible"], 3);
    assert_eq!(summary["processed"], 2);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["workers"], 2);

    for name in ["a.jpg", "b.jpg"] {
        assert_eq!(image::image_dimensions(output.path().join(name)).unwrap(), (40, 20));
    }
    assert!(!output.path().join("c.jpg").exists());
    assert!(!output.path().join("skip.png").exists());
}

#[test]
fn config_file_supplies_defaults() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    ImageBuffer::from_pixel(10, 10, Rgb([1u8, 2, 3]))
        .save(input.path().join("x.png"))
        .unwrap();

    let config = input.path().join("scaler.toml");
    fs::write(
        &config,
        "[scale]\nwidth = 12\nheight = 8\nextension = \".png\"\n\n[pipeline]\nworkers = 1\n",
    )
    .unwrap();

    scaler()
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(output.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed"));

    // outputs are always JPEG encoded, whatever their name
    let bytes = fs::read(output.path().join("x.png")).unwrap();
    let resized = image::load_from_memory(&bytes).unwrap();
    assert_eq!((resized.width(), resized.height()), (12, 8));
}
