use std::io::{BufRead, Write};
use std::sync::Arc;

use cardpipe_service::{Contact, ConversionParameters, ExportAssembler, MappingRegistry};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// A bare contact, or an import line carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContactLine {
    Imported { contact: Contact },
    Bare(Contact),
}

impl From<ContactLine> for Contact {
    fn from(line: ContactLine) -> Self {
        match line {
            ContactLine::Imported { contact } | ContactLine::Bare(contact) => contact,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub contacts: usize,
    pub warnings: usize,
    pub bytes: usize,
}

/// ## Summary
/// Reads JSON-lines contacts. Blank lines are skipped.
///
/// ## Errors
/// Returns an error naming the 1-based line that is not a contact.
pub fn read_contacts<R: BufRead>(input: R) -> AppResult<Vec<Contact>> {
    let mut contacts = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: ContactLine =
            serde_json::from_str(&line).map_err(|source| AppError::ContactJson {
                line: index + 1,
                source,
            })?;
        contacts.push(parsed.into());
    }
    Ok(contacts)
}

/// ## Summary
/// Exports `contacts` as one vCard stream to `out`. Mapping warnings are
/// logged.
///
/// ## Errors
/// Returns the assembler's error in strict mode, before anything is written.
#[tracing::instrument(skip_all, fields(count = contacts.len()))]
pub fn run_export<W: Write>(
    contacts: &[Contact],
    registry: Arc<MappingRegistry>,
    params: ConversionParameters,
    out: &mut W,
) -> AppResult<ExportSummary> {
    let output = ExportAssembler::new(registry, params).export(contacts)?;
    for warning in &output.warnings {
        tracing::warn!(subject = ?warning.subject, kind = ?warning.kind, "{}", warning.message);
    }

    out.write_all(&output.bytes)?;
    out.flush()?;

    Ok(ExportSummary {
        contacts: output.count,
        warnings: output.warnings.len(),
        bytes: output.bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use cardpipe_rfc::vcard::VCardVersion;

    use super::*;

    fn export(input: &str, params: ConversionParameters) -> AppResult<String> {
        let contacts = read_contacts(Cursor::new(input))?;
        let mut out = Vec::new();
        run_export(&contacts, Arc::new(MappingRegistry::standard()), params, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test_log::test]
    fn accepts_bare_and_imported_lines() {
        let input = concat!(
            r#"{"display_name":"Ada","emails":[{"value":"ada@example.com","types":["work"]}]}"#,
            "\n\n",
            r#"{"contact":{"display_name":"Grace"},"warnings":[{"kind":"parser","message":"x"}]}"#,
            "\n",
        );
        let text = export(input, ConversionParameters::default()).unwrap();

        assert_eq!(text.matches("BEGIN:VCARD\r\n").count(), 2);
        assert!(text.contains("FN:Ada\r\n"));
        assert!(text.contains("EMAIL;TYPE=work:ada@example.com\r\n"));
        assert!(text.contains("FN:Grace\r\n"));
    }

    #[test_log::test]
    fn honours_version_and_fields() {
        let input = r#"{"display_name":"Ada","note":"hidden","uid":"ada-1"}"#;
        let params = ConversionParameters::default()
            .with_version(VCardVersion::V3)
            .with_fields(["FN", "UID"]);
        let text = export(input, params).unwrap();

        assert!(text.contains("VERSION:3.0\r\n"));
        assert!(text.contains("UID:ada-1\r\n"));
        assert!(!text.contains("NOTE"));
    }

    #[test_log::test]
    fn bad_json_names_the_line() {
        let input = "{\"display_name\":\"Ada\"}\nnot json\n";
        let err = export(input, ConversionParameters::default()).unwrap_err();
        assert!(matches!(err, AppError::ContactJson { line: 2, .. }));
    }
}
