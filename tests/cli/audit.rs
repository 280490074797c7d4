use anyhow::Result;

use crate::{CliTest, stdout};

fn setup(test: &CliTest) -> Result<()> {
    test.write_file(
        "src/Form.tsx",
        r#"export const Form = () => <button>{t('save')}</button>;
"#,
    )?;
    test.write_file(
        "locales/en.json",
        r#"{ "save": "Save", "common": { "ok": "OK" } }"#,
    )?;
    test.write_file(
        "locales/fr.json",
        r#"{ "save": "Enregistrer", "common": { "ok": "OK" } }"#,
    )
}

#[test]
fn test_audit_reports_suspicious_keys() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.run(&["audit"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("warning: \"save\"  suspicious-key"));
    assert!(out.contains("note: missing-namespace"));
    assert!(out.contains("hint: rename to \"app."));
    assert!(out.contains("Run with --fix"));
    assert!(!out.contains("\"common.ok\""));

    let output = test.run(&["audit", "--fail-on", "warning"])?;
    assert_eq!(output.status.code(), Some(1));

    Ok(())
}

#[test]
fn test_audit_fix_renames_everywhere() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.run(&["audit", "--fix"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Renamed 2 entries across locales, rewrote 1 reference."));

    let code = test.read_file("src/Form.tsx")?;
    assert!(!code.contains("t('save')"));
    assert!(code.contains("t('app."));

    assert_eq!(test.locale_value("en", "save")?, None);
    assert_eq!(test.locale_value("fr", "save")?, None);

    let start = code.find("t('").unwrap() + 3;
    let end = start + code[start..].find('\'').unwrap();
    let key = &code[start..end];
    assert_eq!(test.locale_value("en", key)?, Some("Save".to_string()));
    assert_eq!(
        test.locale_value("fr", key)?,
        Some("Enregistrer".to_string())
    );

    // Nothing suspicious remains.
    let output = test.run(&["audit"])?;
    assert!(stdout(&output).contains("no issues found"));

    Ok(())
}
