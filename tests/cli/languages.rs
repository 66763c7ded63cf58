use anyhow::Result;

use crate::CliTest;

#[test]
fn test_lists_builtin_languages() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.languages_command().output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.trim_start().starts_with("rs")
        && l.contains("Rust")
        && l.contains("//.*")));
    assert!(stdout.lines().any(|l| l.trim_start().starts_with("py")));

    Ok(())
}

#[test]
fn test_lists_plugin_languages_and_warns_on_bad_plugin() -> Result<()> {
    let test = CliTest::with_file(
        "rules/lua.json",
        r#"{ "lua": [{ "type": "single", "pattern": "--.*" }] }"#,
    )?;
    test.write_file("rules/broken.json", r#"{ "x": [{ "type": "single", "pattern": "" }] }"#)?;

    let output = test
        .languages_command()
        .args(["--plugin", "rules/lua.json", "--plugin", "rules/broken.json"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.trim_start().starts_with("lua")));
    assert!(!stdout.lines().any(|l| l.trim_start().starts_with("x ")));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "warning: rules/broken.json: rule source skipped: empty pattern for extension 'x'\n"
    );

    Ok(())
}
