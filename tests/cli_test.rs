use std::process::Command;

const JOB: &str = r#"{
    "name": "cli",
    "operations": [
        { "label": "Face", "program": { "children": [
            { "name": "G0", "parameters": { "X": 4.0, "Y": 2.0, "Z": 1.0 } },
            { "name": "G1", "parameters": { "Z": -1.0, "F": 2.0 } }
        ] } }
    ]
}"#;

fn write_job(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("job.json");
    std::fs::write(&path, JOB).unwrap();
    path
}

#[test]
fn test_cli_writes_gcode_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_snappost"))
        .arg(&job)
        .arg("--options")
        .arg("--no-header --no-comments")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "G21\nG1 X4.000 Y2.000 Z1.000 F300.000\nG1 X4.000 Y2.000 Z-1.000 F120.000\nM5\n"
    );
}

#[test]
fn test_cli_options_file_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(&dir);
    let config = dir.path().join("post.json");
    std::fs::write(&config, r#"{ "units": "imperial", "machine_name": "A250" }"#).unwrap();
    let preview = dir.path().join("preview.b64");
    std::fs::write(&preview, "iVBORw0KGgo=\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_snappost"))
        .arg(&job)
        .arg("--config")
        .arg(&config)
        .arg("--preview")
        .arg(&preview)
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains(";machine: A250\n"));
    assert!(text.contains(";thumbnail: data:image/png;base64,iVBORw0KGgo=\n"));
    assert!(text.contains("\nG20\n"));
}

#[test]
fn test_cli_rejects_bad_options() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_snappost"))
        .arg(&job)
        .arg("--options")
        .arg("--precision many")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
