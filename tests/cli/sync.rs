use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

const CANCEL_BUTTON: &str = r#"export function CancelButton() {
    const label = t('common.cancel') || 'Cancel';
    return <button>{label}</button>;
}
"#;

#[test]
fn test_sync_reports_missing_key() -> Result<()> {
    let test = CliTest::with_file("src/CancelButton.tsx", CANCEL_BUTTON)?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["sync"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("error: \"common.cancel\"  missing-key"));
    assert!(out.contains("--> src/CancelButton.tsx:2:"));
    assert!(out.contains("hint: in-code default: \"Cancel\""));
    assert!(out.contains("1 problem (1 error, 0 warnings, 0 infos)"));

    Ok(())
}

#[test]
fn test_sync_write_seeds_missing_key() -> Result<()> {
    let test = CliTest::with_file("src/CancelButton.tsx", CANCEL_BUTTON)?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["sync", "--write"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Updated en: +1 -0 ~0"));
    assert_eq!(
        test.locale_value("en", "common.cancel")?,
        Some("Cancel".to_string())
    );

    // A second pass finds nothing left to do.
    let output = test.run(&["sync"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("no issues found"));

    Ok(())
}

#[test]
fn test_sync_diff_does_not_write() -> Result<()> {
    let test = CliTest::with_file("src/CancelButton.tsx", CANCEL_BUTTON)?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["sync", "--diff"])?;
    let out = stdout(&output);

    assert!(out.contains("Cancel"));
    assert!(out.contains("Would update en: +1 -0"));
    assert_eq!(test.read_file("locales/en.json")?, "{}\n");

    Ok(())
}

#[test]
fn test_sync_write_and_diff_conflict() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["sync", "--write", "--diff"])?;

    assert_eq!(output.status.code(), Some(2));

    Ok(())
}

#[test]
fn test_sync_unused_key_is_a_warning() -> Result<()> {
    let test = CliTest::with_file("src/CancelButton.tsx", CANCEL_BUTTON)?;
    test.write_file(
        "locales/en.json",
        r#"{ "common": { "cancel": "Cancel", "delete": "Delete" } }"#,
    )?;

    let output = test.run(&["sync"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("warning: \"common.delete\"  unused-key"));
    assert!(out.contains("--> locales/en.json"));

    let output = test.run(&["sync", "--fail-on", "warning"])?;
    assert_eq!(output.status.code(), Some(1));

    Ok(())
}

#[test]
fn test_sync_prune_removes_unused_keys() -> Result<()> {
    let test = CliTest::with_file("src/CancelButton.tsx", CANCEL_BUTTON)?;
    test.write_file(
        "locales/en.json",
        r#"{ "common": { "cancel": "Cancel", "delete": "Delete" } }"#,
    )?;

    // Unused keys are kept unless pruning is requested.
    test.run(&["sync", "--write"])?;
    assert_eq!(
        test.locale_value("en", "common.delete")?,
        Some("Delete".to_string())
    );

    let output = test.run(&["sync", "--write", "--prune"])?;
    assert!(output.status.success(), "{}", stdout(&output));
    assert_eq!(test.locale_value("en", "common.delete")?, None);
    assert_eq!(
        test.locale_value("en", "common.cancel")?,
        Some("Cancel".to_string())
    );

    Ok(())
}

#[test]
fn test_sync_placeholder_mismatch() -> Result<()> {
    let test = CliTest::with_file(
        "src/Greeting.tsx",
        r#"export const Greeting = ({ name }) => <p>{t('home.greeting', { name })}</p>;"#,
    )?;
    test.write_file(
        "locales/en.json",
        r#"{ "home": { "greeting": "Hello {name}" } }"#,
    )?;
    test.write_file(
        "locales/fr.json",
        r#"{ "home": { "greeting": "Bonjour" } }"#,
    )?;

    let output = test.run(&["sync"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("error: \"home.greeting\"  placeholder-mismatch"));
    assert!(out.contains("--> locales/fr.json"));
    assert!(out.contains("note: missing name"));

    Ok(())
}

#[test]
fn test_sync_select_limits_changes() -> Result<()> {
    let test = CliTest::with_file(
        "src/Buttons.tsx",
        r#"export const Buttons = () => (
    <div>
        <button>{t('common.save')}</button>
        <button>{t('common.cancel')}</button>
    </div>
);
"#,
    )?;
    test.write_file("locales/en.json", "{}\n")?;

    let output = test.run(&["sync", "--write", "--select", "common.save"])?;

    // The unselected key is still missing.
    assert_eq!(output.status.code(), Some(1));
    assert!(test.locale_value("en", "common.save")?.is_some());
    assert_eq!(test.locale_value("en", "common.cancel")?, None);

    Ok(())
}
