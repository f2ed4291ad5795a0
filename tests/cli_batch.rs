//! CLI integration tests for batch and stdin processing
//!
//! Runs the built `trimbg` binary against temporary directories.

#![cfg(feature = "cli")]

use image::{ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trimbg"))
}

/// Gray backdrop with an orange square in the middle
fn write_test_image(path: &Path) {
    let mut image = RgbaImage::from_pixel(32, 32, Rgba([200, 200, 200, 255]));
    for y in 12..20 {
        for x in 12..20 {
            image.put_pixel(x, y, Rgba([240, 120, 20, 255]));
        }
    }
    image.save(path).expect("Failed to write test image");
}

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read output directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_cli_batch_directory_to_output_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input_dir = temp_dir.path().join("in");
    let output_dir = temp_dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    for name in ["img2.png", "img10.png", "a_first.bmp"] {
        write_test_image(&input_dir.join(name));
    }
    fs::write(input_dir.join("notes.txt"), "not an image").unwrap();

    let output = Command::new(binary_path())
        .arg(&input_dir)
        .arg("--output")
        .arg(&output_dir)
        .output()
        .expect("Failed to execute CLI");

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        output_names(&output_dir),
        [
            "a_first_bg_removed.png",
            "img10_bg_removed.png",
            "img2_bg_removed.png"
        ]
    );

    let result = image::open(output_dir.join("img2_bg_removed.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(result.get_pixel(0, 0).0[3], 0);
    assert_eq!(result.get_pixel(16, 16).0, [240, 120, 20, 255]);
}

#[test]
fn test_cli_stdin_to_stdout() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("stdin.png");
    write_test_image(&input);
    let input_bytes = fs::read(&input).unwrap();

    let mut child = Command::new(binary_path())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(&input_bytes)
        .unwrap();
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(image::guess_format(&output.stdout).unwrap(), ImageFormat::Png);
    let result = image::load_from_memory(&output.stdout).unwrap().to_rgba8();
    assert_eq!(result.dimensions(), (32, 32));
    assert_eq!(result.get_pixel(31, 31).0[3], 0);
}

#[test]
fn test_cli_failed_file_sets_exit_code() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input_dir = temp_dir.path().join("in");
    let output_dir = temp_dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    write_test_image(&input_dir.join("good.png"));
    fs::write(input_dir.join("broken.png"), [0x89, 0x50, 0x4E, 0x47]).unwrap();
    // decodes fine but is below the minimum size
    RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255]))
        .save(input_dir.join("tiny.png"))
        .unwrap();

    let output = Command::new(binary_path())
        .arg(&input_dir)
        .arg("-o")
        .arg(&output_dir)
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 of 3 image(s) failed"));
    assert_eq!(output_names(&output_dir), ["good_bg_removed.png"]);
}

#[test]
fn test_cli_stats_and_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("photo.png");
    let output_file = temp_dir.path().join("photo.tiff");
    write_test_image(&input);

    let output = Command::new(binary_path())
        .arg(&input)
        .args(["--format", "tiff", "--stats", "-o"])
        .arg(&output_file)
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_line = stderr
        .lines()
        .find(|line| line.starts_with('{'))
        .expect("stats JSON on stderr");
    let stats: serde_json::Value = serde_json::from_str(json_line).unwrap();
    assert_eq!(stats["background"]["r"], 200);
    assert_eq!(stats["threshold"], 30.0);

    let bytes = fs::read(&output_file).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Tiff);
}

#[test]
fn test_cli_missing_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = Command::new(binary_path())
        .arg(temp_dir.path().join("missing.png"))
        .output()
        .expect("Failed to execute CLI");
    assert!(!output.status.success());
}
