use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["sourceLocale"], "en");
    assert_eq!(parsed["localesDir"], "./locales");
    assert_eq!(parsed["translationIdentifier"], "t");
    assert!(
        parsed.get("excludes").is_some(),
        "Config should have 'excludes' field"
    );

    // 2-space indentation
    assert!(content.contains("\n  \"sourceLocale\""));

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .lingorc.json"));
    assert!(test.root().join(".lingorc.json").exists());
    assert_config_content(&test.read_file(".lingorc.json")?)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".lingorc.json", "{}")?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".lingorc.json already exists"));
    assert_eq!(test.read_file(".lingorc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.run(&["init"])?;
    test.write_file(
        "src/app.tsx",
        r#"export function App() { return <div>{t('nav.home')}</div>; }"#,
    )?;
    test.write_file("locales/en.json", r#"{ "nav": { "home": "Home" } }"#)?;

    let output = test.run(&["sync"])?;
    assert!(
        output.status.success(),
        "Sync should work with initialized config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["--help"])?;
    let out = stdout(&output);

    assert!(output.status.success());
    for command in ["scan", "transform", "sync", "audit", "rename", "init"] {
        assert!(out.contains(command), "help should list '{}'", command);
    }

    Ok(())
}
