#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tlvwire::frame::{pack_payload, FrameReader, MAGIC};

fn tlvwire(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tlvwire"));
    cmd.env_remove("TLVWIRE_MAGIC")
        .arg("--log-level")
        .arg("error")
        .args(args);
    cmd
}

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = tlvwire(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("tlvwire should spawn");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");

    child.wait_with_output().expect("tlvwire should exit")
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "tlvwire-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn pack_writes_reference_frame() {
    let out = tlvwire(&["pack", "--action", "5", "--field", "ab", "--field", "cde"])
        .output()
        .expect("pack should run");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        out.stdout,
        vec![
            0x12u8, 0x34, 0x00, 0x0a, 0x05, 0x00, 0x02, b'a', b'b', 0x00, 0x03, b'c', b'd', b'e'
        ]
    );
}

#[test]
fn pack_hex_prints_text() {
    let out = tlvwire(&["pack", "--action", "7", "--data", "raw", "--hex"])
        .output()
        .expect("pack should run");

    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "1234000407726177");
}

#[test]
fn pack_output_decodes_with_frame_reader() {
    let path = unique_temp_file("content");
    std::fs::write(&path, [0xffu8, 0x00, 0x10]).expect("content file should be writable");

    let out = tlvwire(&["pack", "--action", "9", "--file"])
        .arg(&path)
        .output()
        .expect("pack should run");
    let _ = std::fs::remove_file(&path);
    assert!(out.status.success());

    let mut reader = FrameReader::new(out.stdout.as_slice());
    let payload = reader.read_payload().expect("frame should decode");
    assert_eq!(payload.action, 9);
    assert_eq!(payload.content.as_ref(), &[0xffu8, 0x00, 0x10]);
}

#[test]
fn unpack_reads_packed_stream_as_json() {
    let first = tlvwire(&["pack", "-a", "5", "-f", "ab", "-f", "cde"])
        .output()
        .expect("pack should run");
    let second = tlvwire(&["pack", "-a", "6", "-f", "x"])
        .output()
        .expect("pack should run");

    let mut stream = first.stdout;
    stream.extend_from_slice(&second.stdout);

    let out = run_with_stdin(&["--format", "json", "unpack", "--fields"], &stream);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["action"], 5);
    assert_eq!(lines[0]["fields"], serde_json::json!(["ab", "cde"]));
    assert_eq!(lines[1]["index"], 1);
    assert_eq!(lines[1]["fields"], serde_json::json!(["x"]));
}

#[test]
fn unpack_honours_magic_and_count() {
    let packed = tlvwire(&["--magic", "0xBEEF", "pack", "-a", "1", "--data", "one"])
        .output()
        .expect("pack should run");
    assert_eq!(&packed.stdout[..2], &[0xBEu8, 0xEF]);

    let mut stream = packed.stdout.clone();
    stream.extend_from_slice(&packed.stdout);

    let out = run_with_stdin(
        &["--magic", "48879", "--format", "raw", "unpack", "--count", "1"],
        &stream,
    );
    assert!(out.status.success());
    assert_eq!(out.stdout, b"one");
}

#[test]
fn unpack_rejects_wrong_magic() {
    let mut wire = MAGIC.wrapping_add(1).to_be_bytes().to_vec();
    wire.extend_from_slice(&[0x00, 0x01]);
    wire.extend_from_slice(&pack_payload(1, b""));

    let out = run_with_stdin(&["--format", "json", "unpack"], &wire);
    assert_eq!(out.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid frame magic"));
}

#[test]
fn unpack_rejects_empty_payload() {
    let out = run_with_stdin(&["--format", "json", "unpack"], &[0x12, 0x34, 0x00, 0x00]);
    assert_eq!(out.status.code(), Some(60));
}

#[test]
fn pack_rejects_oversized_content() {
    let path = unique_temp_file("oversized");
    std::fs::write(&path, vec![0u8; 65535]).expect("content file should be writable");

    let out = tlvwire(&["pack", "-a", "1", "--file"])
        .arg(&path)
        .output()
        .expect("pack should run");
    let _ = std::fs::remove_file(&path);

    assert_eq!(out.status.code(), Some(60));
    assert!(out.stdout.is_empty());
}
