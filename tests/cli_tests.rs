use assert_cmd::Command;
use predicates::str::contains;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("braid-{}-{name}", std::process::id()))
}

#[test]
fn assembles_hello_world() {
    let out = temp_path("hello.lc3");

    Command::cargo_bin("braid")
        .unwrap()
        .arg("asm")
        .arg("tests/files/hello.asm")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Finished"));

    let image = std::fs::read(&out).unwrap();
    assert_eq!(image.len(), 2 * 65536);

    let word = |addr: usize| u16::from_be_bytes([image[addr * 2], image[addr * 2 + 1]]);
    assert_eq!(word(0x0200), 0b1110_001_000001100); // LEA R1, BANNER
    assert_eq!(word(0x020A), 0xFE04); // DSRPTR
    assert_eq!(word(0x020D), 'H' as u16); // BANNER[0]
    assert_eq!(word(0x0000), 0);
}

#[test]
fn runs_hello_world() {
    let out = temp_path("run-hello.lc3");

    Command::cargo_bin("braid")
        .unwrap()
        .arg("asm")
        .arg("tests/files/hello.asm")
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    Command::cargo_bin("braid")
        .unwrap()
        .arg("run")
        .arg(&out)
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Hello, world!"));
}

#[test]
fn echoes_keyboard_input() {
    let out = temp_path("echo.lc3");

    Command::cargo_bin("braid")
        .unwrap()
        .arg("asm")
        .arg("tests/files/echo.asm")
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    Command::cargo_bin("braid")
        .unwrap()
        .arg("run")
        .arg(&out)
        .write_stdin("abcdef")
        .assert()
        .success()
        .stdout(contains("abc"));
}

#[test]
fn reports_assembly_errors() {
    Command::cargo_bin("braid")
        .unwrap()
        .arg("asm")
        .write_stdin("ADD R0, R1\nJSR NOWHERE\n")
        .assert()
        .failure()
        .stderr(contains("Invalid number of arguments"))
        .stderr(contains("Unknown label"));
}

#[test]
fn checks_without_output() {
    Command::cargo_bin("braid")
        .unwrap()
        .arg("check")
        .arg("tests/files/hello.asm")
        .assert()
        .success()
        .stdout(contains("0 errors"));
}

#[test]
fn debugger_drives_a_run() {
    let out = temp_path("debug-hello.lc3");

    Command::cargo_bin("braid")
        .unwrap()
        .arg("asm")
        .arg("tests/files/hello.asm")
        .arg("--debug")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Symbols"));

    // The piped REPL inspects state, sets a register, and continues
    Command::cargo_bin("braid")
        .unwrap()
        .arg("run")
        .arg("--debug")
        .arg(&out)
        .write_stdin("reg\nlabels\nc\n")
        .assert()
        .success()
        .stdout(contains("PC:"))
        .stdout(contains("BANNER"))
        .stdout(contains("Hello, world!"));
}
