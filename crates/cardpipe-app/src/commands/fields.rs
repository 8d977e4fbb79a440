use std::io::Write;

use cardpipe_service::MappingRegistry;

use crate::error::AppResult;

/// ## Summary
/// Writes the registered mappings in evaluation order, one per line: the
/// mapping name, its vCard properties and the contact fields it fills.
///
/// ## Errors
/// Returns an error if writing fails.
pub fn run_fields<W: Write>(registry: &MappingRegistry, out: &mut W) -> AppResult<()> {
    writeln!(out, "{:<14} {:<52} FIELDS", "MAPPING", "PROPERTIES")?;
    for mapping in registry.mappings() {
        let fields: Vec<_> = mapping
            .domain_fields()
            .iter()
            .map(|field| field.as_str())
            .collect();
        writeln!(
            out,
            "{:<14} {:<52} {}",
            mapping.name(),
            mapping.property_names().join(","),
            fields.join(",")
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_mapping_in_order() {
        let registry = MappingRegistry::standard();
        let mut out = Vec::new();
        run_fields(&registry, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), registry.mappings().count());
        for (row, mapping) in rows.iter().zip(registry.mappings()) {
            assert!(row.starts_with(mapping.name()), "{row}");
        }
        assert!(text.contains("X-ADDRESSBOOKSERVER-MEMBER"));
    }
}
