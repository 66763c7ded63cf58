use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_scan_groups_single_line_comments() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// a\n// b\ncode()\n// c\n")?;

    assert_cmd_snapshot!(test.scan_command().arg("--no-cache"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1-2:
    // a
    // b

    a.rs:4: // c

    ✓ Scanned 1 file: 2 blocks, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_unterminated_comment_is_reported() -> Result<()> {
    let test = CliTest::with_file("main.c", "int x;\n/* open\nint y;\n")?;

    assert_cmd_snapshot!(test.scan_command().arg("--no-cache"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    main.c:2-3: (unterminated)
    /* open
    int y;

    ✓ Scanned 1 file: 1 block, 1 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_depth_defaults_to_root_only() -> Result<()> {
    let test = CliTest::with_file("top.py", "# top\n")?;
    test.write_file("pkg/nested.py", "# nested\n")?;

    assert_cmd_snapshot!(test.scan_command().arg("--no-cache"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    top.py:1: # top

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--max-depth", "unbounded"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg/nested.py:1: # nested

    top.py:1: # top

    ✓ Scanned 2 files: 2 blocks, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_scan_subdirectory_root() -> Result<()> {
    let test = CliTest::with_file("src/lib.rs", "//! crate docs\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["src", "--no-cache"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    src/lib.rs:1: //! crate docs

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_fail_on_exits_with_failure() -> Result<()> {
    let test = CliTest::with_file("a.py", "# FIXME: broken\nx = 1\n# fine\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--fail-on", "fixme"]), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    a.py:1: # FIXME: broken

    a.py:3: # fine

    ✘ 1 block matched --fail-on:
      --> a.py:1

    ✘ Scanned 1 file: 2 blocks, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    let output = test
        .scan_command()
        .args(["--no-cache", "--fail-on", "xxx"])
        .output()?;
    assert!(output.status.success());

    Ok(())
}

#[test]
fn test_filters() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// one\n\n/* two\n   lines */\n")?;
    test.write_file("b.py", "# TODO later\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--only", "multi"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:3-4:
    /* two
       lines */

    ✓ Scanned 2 files: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    // --ext also narrows the walk, so only one file is scanned.
    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--ext", "py"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    b.py:1: # TODO later

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--contains", "todo"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    b.py:1: # TODO later

    ✓ Scanned 2 files: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--min-lines", "2"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:3-4:
    /* two
       lines */

    ✓ Scanned 2 files: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_show_content_and_strip_markers() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// hello\n// world\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--show-content"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    // hello
    // world

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    assert_cmd_snapshot!(test.scan_command().args([
        "--no-cache",
        "--show-content",
        "--strip-markers",
    ]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    hello
    world

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let test = CliTest::with_file("a.rs", "fn main() {\n    // inside\n}\n")?;

    let output = test
        .scan_command()
        .args(["--no-cache", "--format", "json", "--symbols", "--summary"])
        .output()?;
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout)?;
    let block = &value["blocks"][0];
    assert_eq!(block["filePath"], "a.rs");
    assert_eq!(block["startLine"], 2);
    assert_eq!(block["kind"], "single");
    assert_eq!(block["text"], "// inside");
    assert_eq!(block["enclosingSymbol"], "main");
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
    assert_eq!(value["summary"]["totalBlocks"], 1);

    Ok(())
}

#[test]
fn test_summary_table() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// x\n")?;
    test.write_file("b.py", "# y\n\n# z\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--summary"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1: // x

    b.py:1: # y

    b.py:3: # z

    Summary
      Blocks         3 (3 single, 0 multi)
      Comment lines  3
      Unterminated   0
      Files          2
    By extension
      py  2
      rs  1
    Top files
      b.py  2
      a.rs  1

    ✓ Scanned 2 files: 3 blocks, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_cache_is_written_and_reused() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// cached\n")?;

    assert_cmd_snapshot!(test.scan_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1: // cached

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");
    let cache: Value = serde_json::from_str(&test.read_file(".commentary-cache.json")?)?;
    assert_eq!(cache["formatVersion"], 1);
    assert_eq!(cache["entries"].as_object().map(|e| e.len()), Some(1));

    assert_cmd_snapshot!(test.scan_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1: // cached

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    test.write_file("a.rs", "// changed\n")?;
    assert_cmd_snapshot!(test.scan_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1: // changed

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_corrupted_cache_warns_and_recovers() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// ok\n")?;
    test.write_file(".commentary-cache.json", "not json")?;

    insta::with_settings!({filters => vec![(r"corrupted: .+;", "corrupted: [DETAIL];")]}, {
        assert_cmd_snapshot!(test.scan_command(), @r"
        success: true
        exit_code: 0
        ----- stdout -----
        a.rs:1: // ok

        ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

        ----- stderr -----
        warning: ./.commentary-cache.json: cache file is corrupted: [DETAIL]; starting with an empty cache
        ");
    });

    let cache: Value = serde_json::from_str(&test.read_file(".commentary-cache.json")?)?;
    assert_eq!(cache["formatVersion"], 1);

    Ok(())
}

#[test]
fn test_undecodable_file_reported_as_warning() -> Result<()> {
    let test = CliTest::with_file("good.rs", "// good\n")?;
    std::fs::write(test.root().join("bad.rs"), [0x2f, 0x2f, 0xff, 0xfe])?;

    assert_cmd_snapshot!(test.scan_command().arg("--no-cache"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    good.rs:1: // good

    ✓ Scanned 2 files: 1 block, 0 unterminated, 1 error

    ----- stderr -----
    warning: 1 file(s) could not be scanned (use -v for details)
    ");

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "-v"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    good.rs:1: // good

    ✓ Scanned 2 files: 1 block, 0 unterminated, 1 error

    ----- stderr -----
    warning: bad.rs: content is not valid UTF-8
    ");

    Ok(())
}

#[test]
fn test_explicit_files() -> Result<()> {
    let test = CliTest::with_file("src/a.rs", "// a\n")?;
    test.write_file("src/b.rs", "// b\n")?;
    test.write_file("notes.txt", "plain\n")?;

    assert_cmd_snapshot!(test.scan_command().args([
        "--no-cache",
        "--files",
        "src/*.rs",
        "missing.rs",
        "-v",
    ]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    src/a.rs:1: // a

    src/b.rs:1: // b

    ✓ Scanned 2 files: 2 blocks, 0 unterminated, 1 error

    ----- stderr -----
    warning: missing.rs: file not found
    ");

    test.write_file("list.txt", "src/b.rs\nnotes.txt\n")?;
    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--filelist", "list.txt", "-v"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    src/b.rs:1: // b

    ✓ Scanned 1 file: 1 block, 0 unterminated, 1 error

    ----- stderr -----
    warning: notes.txt: no comment rules registered for extension
    ");

    Ok(())
}

#[test]
fn test_plugin_rules() -> Result<()> {
    let test = CliTest::with_file("init.lua", "-- setup\nx = 1\n")?;
    test.write_file(
        "rules/lua.json",
        r#"{ "lua": [{ "type": "single", "pattern": "--.*" }] }"#,
    )?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--plugin", "rules/lua.json"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    init.lua:1: -- setup

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_progress_lines_on_stderr() -> Result<()> {
    let test = CliTest::with_file("a.rs", "// a\n")?;

    assert_cmd_snapshot!(test.scan_command().args(["--no-cache", "--progress"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    a.rs:1: // a

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    [1/1] a.rs
    ");

    Ok(())
}

#[test]
fn test_config_file_is_applied() -> Result<()> {
    let test = CliTest::with_file(
        ".commentaryrc.json",
        r#"{ "maxDepth": "unbounded", "ignore": ["vendor"], "cache": false }"#,
    )?;
    test.write_file("lib/a.py", "# kept\n")?;
    test.write_file("vendor/b.py", "# skipped\n")?;

    assert_cmd_snapshot!(test.scan_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    lib/a.py:1: # kept

    ✓ Scanned 1 file: 1 block, 0 unterminated, 0 errors

    ----- stderr -----
    ");
    assert!(!test.root().join(".commentary-cache.json").exists());

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file(".commentaryrc.json", r#"{ "workers": 0 }"#)?;

    assert_cmd_snapshot!(test.scan_command(), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Invalid value in 'workers': must be at least 1
    ");

    let test = CliTest::new()?;
    let output = test
        .scan_command()
        .args(["--ignore-regex", "("])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ignoreRegex"));

    Ok(())
}

#[test]
fn test_missing_root_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.scan_command().arg("does-not-exist"), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Scan root does not exist: does-not-exist
    ");

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));

    Ok(())
}
