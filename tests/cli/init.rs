use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .commentaryrc.json

    ----- stderr -----
    ");

    let content = test.read_file(".commentaryrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["maxDepth"], 0);
    assert_eq!(parsed["cache"], true);
    assert!(parsed.get("ignorePatterns").is_some());
    assert!(parsed.get("highlight").is_some());

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".commentaryrc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .commentaryrc.json already exists
    ");
    assert_eq!(test.read_file(".commentaryrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("main.py", "# entry point\n")?;

    let output = test.scan_command().output()?;
    assert!(
        output.status.success(),
        "Scan should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("main.py:1: # entry point"));

    Ok(())
}
