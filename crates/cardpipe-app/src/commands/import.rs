use std::io::{Read, Write};
use std::sync::Arc;

use cardpipe_service::{
    Contact, ConversionParameters, ImportIterator, ImportedContact, MappingRegistry, Warning,
};
use serde::Serialize;

use crate::error::AppResult;

#[derive(Serialize)]
struct ImportLine<'a> {
    contact: &'a Contact,
    #[serde(skip_serializing_if = "<[Warning]>::is_empty")]
    warnings: &'a [Warning],
    #[serde(skip_serializing_if = "Option::is_none")]
    uid_hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original: Option<OriginalLine>,
}

#[derive(Serialize)]
struct OriginalLine {
    etag: String,
    vcard: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub contacts: u64,
    pub warnings: u64,
}

fn write_line<W: Write>(imported: ImportedContact, out: &mut W) -> AppResult<usize> {
    let ImportedContact {
        contact,
        warnings,
        original,
        uid_hint,
    } = imported;

    let original = match original {
        Some(original) => {
            let etag = original.etag().to_string();
            let bytes = original.into_bytes()?;
            Some(OriginalLine {
                etag,
                vcard: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
        None => None,
    };

    serde_json::to_writer(
        &mut *out,
        &ImportLine {
            contact: &contact,
            warnings: &warnings,
            uid_hint: uid_hint.as_deref(),
            original,
        },
    )?;
    out.write_all(b"\n")?;
    Ok(warnings.len())
}

/// ## Summary
/// Imports every card from `input`, writing one JSON object per contact to
/// `out` as soon as it is mapped.
///
/// ## Errors
/// Returns the stream failure that ended the import, after the contacts
/// before it have been written. Output failures are returned as they happen.
#[tracing::instrument(skip_all, fields(fields = ?params.fields, max_size = ?params.max_size))]
pub fn run_import<R, W>(
    input: R,
    registry: Arc<MappingRegistry>,
    params: ConversionParameters,
    out: &mut W,
) -> AppResult<ImportSummary>
where
    R: Read,
    W: Write,
{
    let mut summary = ImportSummary::default();
    for imported in ImportIterator::from_reader(input, registry, params) {
        let warnings = write_line(imported?, out)?;
        summary.contacts += 1;
        summary.warnings += warnings as u64;
    }
    out.flush()?;

    tracing::info!(
        contacts = summary.contacts,
        warnings = summary.warnings,
        "Import finished"
    );
    Ok(summary)
}
