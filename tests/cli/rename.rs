use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const BUTTON: &str = r#"export const SaveButton = () => <button>{t('common.save')}</button>;
"#;

fn setup(test: &CliTest) -> Result<()> {
    test.write_file("src/SaveButton.tsx", BUTTON)?;
    test.write_file("locales/en.json", r#"{ "common": { "save": "Save" } }"#)?;
    test.write_file(
        "locales/fr.json",
        r#"{ "common": { "save": "Enregistrer" } }"#,
    )
}

#[test]
fn test_rename_dry_run() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.run(&["rename", "common.save", "common.submit"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains(
        "Would rename 'common.save' -> 'common.submit' in 2 locales (en, fr) and 1 reference."
    ));
    assert_eq!(test.read_file("src/SaveButton.tsx")?, BUTTON);
    assert_eq!(
        test.locale_value("en", "common.save")?,
        Some("Save".to_string())
    );

    Ok(())
}

#[test]
fn test_rename_write() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.run(&["rename", "common.save", "common.submit", "--write"])?;
    assert!(output.status.success(), "{}", stdout(&output));

    assert_eq!(
        test.read_file("src/SaveButton.tsx")?,
        BUTTON.replace("common.save", "common.submit")
    );
    assert_eq!(test.locale_value("en", "common.save")?, None);
    assert_eq!(
        test.locale_value("en", "common.submit")?,
        Some("Save".to_string())
    );
    assert_eq!(
        test.locale_value("fr", "common.submit")?,
        Some("Enregistrer".to_string())
    );

    Ok(())
}

#[test]
fn test_rename_unknown_key() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.run(&["rename", "common.missing", "common.other"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Key 'common.missing' not found in any locale"));

    Ok(())
}

#[test]
fn test_rename_onto_existing_key_is_refused() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;
    test.write_file(
        "locales/en.json",
        r#"{ "common": { "save": "Save", "submit": "Submit" } }"#,
    )?;

    let output = test.run(&["rename", "common.save", "common.submit", "--write"])?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(test.read_file("src/SaveButton.tsx")?, BUTTON);
    assert_eq!(
        test.locale_value("en", "common.save")?,
        Some("Save".to_string())
    );

    Ok(())
}
