use expectrl::{Regex, spawn};

#[test]
fn console_starts_with_banner_and_prompt() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex("Python ")).expect("startup banner");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("exit").expect("exit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn expression_echoes_rendered_value() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("1 + 2").expect("expression input");
    p.expect(Regex("3\r?\n")).expect("rendered value");
    p.expect(Regex(">>> ")).expect("prompt persists");
    p.send_line("exit").expect("exit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn session_state_persists_between_chunks() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("x = 41").expect("assignment");
    p.expect(Regex(">>> ")).expect("prompt after statement");
    p.send_line("x + 1").expect("expression");
    p.expect(Regex("42\r?\n")).expect("value from prior binding");
    p.send_line("quit").expect("quit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn open_block_switches_to_continuation_prompt() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("if True:").expect("open block");
    p.expect(Regex("\\.\\.\\. ")).expect("continuation prompt");
    p.send_line("    y = 7").expect("block body");
    p.expect(Regex(">>> ")).expect("primary prompt returns");
    p.send_line("y").expect("read binding");
    p.expect(Regex("7\r?\n")).expect("binding from block");
    p.send_line("exit").expect("exit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn syntax_fault_prints_diagnostic_and_keeps_going() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("def f(:").expect("bad input");
    p.expect(Regex("SyntaxError")).expect("diagnostic");
    p.expect(Regex(">>> ")).expect("prompt persists");
    p.send_line("exit").expect("exit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn runtime_fault_prints_full_traceback() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("1 / 0").expect("failing expression");
    p.expect(Regex("Traceback \\(most recent call last\\):"))
        .expect("traceback header");
    p.expect(Regex("ZeroDivisionError: division by zero"))
        .expect("exception type and message");
    p.expect(Regex(">>> ")).expect("prompt persists");
    p.send_line("quit").expect("quit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn redirected_stdin_reads_a_line_from_the_terminal() {
    let mut p = spawn(binary_path()).expect("spawn binary");
    p.expect(Regex(">>> ")).expect("primary prompt");
    p.send_line("name = input()").expect("input chunk");
    p.send_line("zoe").expect("stdin line");
    p.expect(Regex(">>> ")).expect("prompt after input");
    p.send_line("name").expect("read binding");
    p.expect(Regex("'zoe'")).expect("captured stdin value");
    p.send_line("exit").expect("exit line");
    p.expect(expectrl::Eof).expect("process exits");
}

#[test]
fn smoke_python_flag_initializes_and_exits() {
    let home_dir = tempfile::tempdir().expect("create temp home");
    let xdg_config_home = tempfile::tempdir().expect("create temp xdg config home");

    let output = std::process::Command::new(binary_path())
        .arg("--smoke-python")
        .env("HOME", home_dir.path())
        .env("XDG_CONFIG_HOME", xdg_config_home.path())
        .output()
        .expect("run --smoke-python");

    assert!(
        output.status.success(),
        "--smoke-python should exit successfully"
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    assert!(
        stdout.contains("smoke-python: ok"),
        "smoke output should report success, got: {stdout:?}"
    );
}

fn binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_pyconsole").unwrap_or_else(|_| "target/debug/pyconsole".to_string())
}
