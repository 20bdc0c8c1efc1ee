use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_audio_similarity_cli"))
}

fn write_tone(path: &Path, frequency: f32, amplitude: f32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for i in 0..8000 {
        let t = i as f32 / 16000.0;
        let value = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
        writer
            .write_sample((value * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Library with two categories plus a query clip outside it
fn library(name: &str) -> (PathBuf, PathBuf) {
    let root = std::env::temp_dir().join(format!(
        "audio_similarity_cli_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&root);
    let data = root.join("data");
    fs::create_dir_all(data.join("kick")).unwrap();
    fs::create_dir_all(data.join("hat")).unwrap();
    write_tone(&data.join("kick/low.wav"), 60.0, 0.9);
    write_tone(&data.join("kick/mid.wav"), 150.0, 0.7);
    write_tone(&data.join("hat/high.wav"), 6000.0, 0.2);

    let query = root.join("upload.wav");
    write_tone(&query, 65.0, 0.85);
    (root, query)
}

#[test]
fn query_ranks_closest_clip_first() {
    let (root, query) = library("rank");
    let output = cli()
        .arg("query")
        .arg("--data-dir")
        .arg(root.join("data"))
        .args(["--k", "2"])
        .arg(&query)
        .output()
        .expect("failed to run audio_similarity_cli query");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("query report JSON payload");
    assert_eq!(json["indexed"], 3);
    let matches = json["results"][0]["matches"].as_array().expect("matches");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["label"], "kick/low.wav");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn query_with_insert_indexes_uploaded_clip() {
    let (root, query) = library("insert");
    let output = cli()
        .arg("query")
        .arg("--data-dir")
        .arg(root.join("data"))
        .arg("--insert")
        .arg(&query)
        .arg(&query)
        .output()
        .expect("failed to run audio_similarity_cli query --insert");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("query report JSON payload");
    assert_eq!(json["indexed"], 5);
    assert_eq!(json["results"][0]["inserted_id"], 3);
    // Second pass finds the first upload itself at distance zero
    let second = &json["results"][1]["matches"][0];
    assert_eq!(second["label"], "upload.wav");
    assert_eq!(second["distance"].as_f64(), Some(0.0));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn extract_prints_descriptor() {
    let (root, query) = library("extract");
    let output = cli()
        .arg("extract")
        .arg(&query)
        .output()
        .expect("failed to run audio_similarity_cli extract");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("extract JSON payload");
    assert_eq!(json["sample_rate"], 16000);
    assert!(json["descriptor"]["rms"].as_f64().unwrap_or_default() > 0.0);
    assert!(json["descriptor"]["spectral_centroid"].is_number());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn list_shows_library_labels() {
    let (root, _) = library("list");
    let output = cli()
        .arg("list")
        .arg("--data-dir")
        .arg(root.join("data"))
        .output()
        .expect("failed to run audio_similarity_cli list");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["hat/high.wav", "kick/low.wav", "kick/mid.wav"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_clip_fails() {
    let (root, _) = library("missing");
    let output = cli()
        .arg("query")
        .arg("--data-dir")
        .arg(root.join("data"))
        .arg(root.join("nope.wav"))
        .output()
        .expect("failed to run audio_similarity_cli");
    assert_eq!(output.status.code(), Some(1));

    let _ = fs::remove_dir_all(&root);
}
