use anyhow::Result;

use crate::{CliTest, stdout};

#[test]
fn test_scan_lists_candidates() -> Result<()> {
    let test = CliTest::with_file(
        "src/App.tsx",
        r#"export function App() {
    return <h1>Welcome back</h1>;
}
"#,
    )?;

    let output = test.run(&["scan"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("candidate: \"Welcome back\"  bare-text"));
    assert!(out.contains("--> src/App.tsx:2:"));
    assert!(out.contains("key: app."));
    assert!(out.contains("Found 1 candidate in 1 file."));

    Ok(())
}

#[test]
fn test_scan_explain_lists_rejected_text() -> Result<()> {
    let test = CliTest::with_file(
        "src/App.tsx",
        r#"export function App() {
    return <div><h1>Welcome back</h1><span>42</span></div>;
}
"#,
    )?;

    let plain = stdout(&test.run(&["scan"])?);
    assert!(!plain.contains("skipped:"));

    let explained = stdout(&test.run(&["scan", "--explain"])?);
    assert!(explained.contains("skipped: \"42\""));

    Ok(())
}

#[test]
fn test_scan_vue_template() -> Result<()> {
    let test = CliTest::with_file(
        "src/Profile.vue",
        r#"<template>
  <button title="Save your profile">Save changes</button>
</template>

<script setup>
const count = 1;
</script>
"#,
    )?;

    let out = stdout(&test.run(&["scan"])?);

    assert!(out.contains("\"Save changes\""));
    assert!(out.contains("\"Save your profile\""));
    assert!(out.contains("src/Profile.vue:2:"));

    Ok(())
}

#[test]
fn test_scan_ignores_test_files() -> Result<()> {
    let test = CliTest::with_file(
        "src/App.test.tsx",
        r#"export const A = () => <p>Only in tests</p>;"#,
    )?;

    let output = test.run(&["scan"])?;
    let out = stdout(&output);

    assert!(output.status.success());
    assert!(!out.contains("Only in tests"));
    assert!(out.contains("Found 0 candidates in 0 files."));

    Ok(())
}

#[test]
fn test_scan_source_root_override() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("web/App.tsx", r#"export const A = () => <p>Inside web</p>;"#)?;
    test.write_file("other/App.tsx", r#"export const B = () => <p>Outside web</p>;"#)?;

    let out = stdout(&test.run(&["scan", "--source-root", "web"])?);

    assert!(out.contains("Inside web"));
    assert!(!out.contains("Outside web"));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".lingorc.json", r#"{ "excludes": ["[invalid"] }"#)?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("Invalid glob pattern in 'excludes'"));

    Ok(())
}
