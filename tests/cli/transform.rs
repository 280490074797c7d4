use anyhow::Result;

use crate::{CliTest, stdout};

const APP: &str = r#"export function App() {
    return <h1>Welcome back</h1>;
}
"#;

#[test]
fn test_transform_dry_run_changes_nothing() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;

    let output = test.run(&["transform"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("src/App.tsx"));
    assert!(out.contains("\"Welcome back\" -> app."));
    assert!(out.contains("Would replace 1 text in 1 file."));
    assert!(out.contains("Run with --write"));
    assert_eq!(test.read_file("src/App.tsx")?, APP);
    assert!(!test.root().join("locales/en.json").exists());

    Ok(())
}

#[test]
fn test_transform_write_rewrites_code_and_locale() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["transform", "--write"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Replaced 1 text in 1 file, added 1 key to the source locale."));

    let code = test.read_file("src/App.tsx")?;
    assert!(!code.contains("<h1>Welcome back</h1>"));
    assert!(code.contains("<h1>{t('app."));

    // The inserted key resolves to the original text.
    let start = code.find("t('").unwrap() + 3;
    let end = start + code[start..].find('\'').unwrap();
    let key = &code[start..end];
    assert_eq!(
        test.locale_value("en", key)?,
        Some("Welcome back".to_string())
    );

    Ok(())
}

#[test]
fn test_transform_is_idempotent() -> Result<()> {
    let test = CliTest::with_file("src/App.tsx", APP)?;

    test.run(&["transform", "--write"])?;
    let first = test.read_file("src/App.tsx")?;

    let output = test.run(&["transform", "--write"])?;
    assert!(stdout(&output).contains("Nothing to transform."));
    assert_eq!(test.read_file("src/App.tsx")?, first);

    Ok(())
}

#[test]
fn test_transform_respects_skip_directive() -> Result<()> {
    let test = CliTest::with_file(
        "src/App.tsx",
        r#"export function App() {
    // lingo-skip
    const label = <span>Keep me</span>;
    return <p>Translate me</p>;
}
"#,
    )?;

    let out = stdout(&test.run(&["transform"])?);

    assert!(out.contains("\"Translate me\""));
    assert!(!out.contains("\"Keep me\""));

    Ok(())
}

#[test]
fn test_scan_after_transform_finds_nothing() -> Result<()> {
    let test = CliTest::with_file(
        "src/Profile.tsx",
        r#"export const Profile = ({ name }) => (
  <section>
    <h1>Account settings</h1>
    <input placeholder="Your email" />
    <p>{`Hello   ${name}, welcome back`}</p>
  </section>
);
"#,
    )?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["transform", "--write"])?;
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("Replaced 3 texts in 1 file"));

    let output = test.run(&["scan"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Found 0 candidates in 0 files."), "{}", out);

    Ok(())
}
