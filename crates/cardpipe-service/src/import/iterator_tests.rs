use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cardpipe_rfc::vcard::VCard;

use super::*;
use crate::contact::Contact;
use crate::error::ImportError;
use crate::mapping::MappingRegistry;
use crate::parameters::ConversionParameters;
use crate::warning::WarningKind;

const TWO_CARDS: &str = "\
BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:one\r\n\
FN:First Person\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:two\r\n\
FN:Second Person\r\n\
END:VCARD\r\n";

fn import(input: &str, params: ConversionParameters) -> ImportIterator<FramedCardSource<Cursor<Vec<u8>>>> {
    ImportIterator::from_reader(
        Cursor::new(input.as_bytes().to_vec()),
        Arc::new(MappingRegistry::standard()),
        params,
    )
}

#[test_log::test]
fn pulls_records_in_order() {
    let mut contacts = import(TWO_CARDS, ConversionParameters::default());
    assert_eq!(contacts.state(), ImportState::Idle);

    let first = contacts.next().unwrap().unwrap();
    assert_eq!(contacts.state(), ImportState::Ready);
    assert_eq!(first.contact.display_name.as_deref(), Some("First Person"));
    assert_eq!(first.uid_hint.as_deref(), Some("one"));
    assert!(first.warnings.is_empty(), "{:?}", first.warnings);

    let second = contacts.next().unwrap().unwrap();
    assert_eq!(second.contact.uid.as_deref(), Some("two"));
    assert_ne!(first.contact.id, second.contact.id);

    assert!(contacts.next().is_none());
    assert_eq!(contacts.state(), ImportState::Exhausted);
    assert!(contacts.source().is_none());
    assert_eq!(contacts.imported(), 2);
    assert!(contacts.next().is_none());
}

#[test_log::test]
fn empty_stream_is_exhausted_immediately() {
    let mut contacts = import("no cards here\r\n", ConversionParameters::default());
    assert!(contacts.next().is_none());
    assert_eq!(contacts.state(), ImportState::Exhausted);
}

#[test_log::test]
fn size_limit_fails_once_then_stops() {
    let limit = (TWO_CARDS.len() - 10) as u64;
    let mut contacts = import(TWO_CARDS, ConversionParameters::default().with_max_size(Some(limit)));

    let results: Vec<_> = contacts.by_ref().collect();
    assert_eq!(results.len(), 2);

    // The first card lies wholly under the limit.
    let first = results[0].as_ref().unwrap();
    assert_eq!(first.contact.uid.as_deref(), Some("one"));

    let failure = results[1].as_ref().unwrap_err();
    assert!(matches!(failure, ImportError::SizeExceeded(exceeded) if exceeded.limit == limit));
    assert_eq!(contacts.state(), ImportState::Failed);
    assert!(contacts.next().is_none());
}

#[test_log::test]
fn zero_size_limit_imports_everything() {
    let contacts = import(TWO_CARDS, ConversionParameters::default().with_max_size(Some(0)));
    let uids: Vec<_> = contacts
        .map(|imported| imported.unwrap().contact.uid)
        .collect();
    assert_eq!(uids, [Some("one".to_string()), Some("two".to_string())]);
}

#[test_log::test]
fn validation_warnings_follow_mapping_warnings() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:no-fn\r\nEND:VCARD\r\n";

    let imported = import(input, ConversionParameters::default()).next().unwrap().unwrap();
    assert!(imported.warnings.iter().any(|w| w.kind == WarningKind::Validation
        && w.code.as_deref() == Some("missing-required-property")));

    let skipped = import(input, ConversionParameters::default().with_skip_validation(true))
        .next()
        .unwrap()
        .unwrap();
    assert!(skipped.warnings.iter().all(|w| w.kind != WarningKind::Validation));
}

#[test_log::test]
fn decoder_warnings_are_attached() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Ok\r\nthis line is broken\r\nEND:VCARD\r\n";
    let imported = import(input, ConversionParameters::default()).next().unwrap().unwrap();
    assert_eq!(imported.contact.display_name.as_deref(), Some("Ok"));
    assert!(imported.warnings.iter().any(|w| w.kind == WarningKind::Parser));
}

#[test_log::test]
fn strict_import_reports_unknown_properties() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Ok\r\nSHOESIZE:44\r\nEND:VCARD\r\n";

    let lenient = import(input, ConversionParameters::default()).next().unwrap().unwrap();
    assert!(lenient.warnings.iter().all(|w| w.kind != WarningKind::Parser));

    let strict = import(input, ConversionParameters::default().with_strict(true))
        .next()
        .unwrap()
        .unwrap();
    assert!(strict.warnings.iter().any(|w| w.kind == WarningKind::Parser));
}

#[test_log::test]
fn latin1_records_are_flagged() {
    let mut bytes = b"BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ren".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"\r\nN:;;;;\r\nEND:VCARD\r\n");

    let imported = ImportIterator::from_reader(
        Cursor::new(bytes),
        Arc::new(MappingRegistry::standard()),
        ConversionParameters::default(),
    )
    .next()
    .unwrap()
    .unwrap();

    assert_eq!(imported.contact.display_name.as_deref(), Some("René"));
    assert!(imported.warnings.iter().any(|w| w.code.as_deref() == Some("non-utf8-input")));
}

#[test_log::test]
fn originals_are_retained_with_etag() {
    let params = ConversionParameters::default().with_retain_original(true);
    let imported = import(TWO_CARDS, params).next().unwrap().unwrap();

    let original = imported.original.unwrap();
    let etag = original.etag().to_string();
    let bytes = original.into_bytes().unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();

    assert!(text.starts_with("BEGIN:VCARD\r\nVERSION:4.0\r\n"));
    assert!(text.contains("FN:First Person"));
    assert_eq!(etag, generate_etag(&bytes));
}

#[test_log::test]
fn unserializable_original_is_a_warning() {
    // CLASS is not a vCard 4.0 property, so strict re-serialization refuses it.
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Secret\r\nCLASS:PRIVATE\r\nEND:VCARD\r\n";
    let params = ConversionParameters::default().with_retain_original(true);
    let imported = import(input, params).next().unwrap().unwrap();

    assert!(imported.original.is_none());
    assert!(imported.contact.private);
    assert!(imported
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::OriginalNotStored));
}

#[test_log::test]
fn merge_lookup_supplies_existing_contact() {
    let mut existing = Contact::new();
    existing.uid = Some("two".to_string());
    existing.note = Some("kept".to_string());
    let existing_id = existing.id;

    let params = ConversionParameters::default().with_fields(["FN", "UID"]);
    let mut contacts = import(TWO_CARDS, params).with_merge_lookup(move |uid| {
        (uid == "two").then(|| existing.clone())
    });

    let first = contacts.next().unwrap().unwrap();
    assert_ne!(first.contact.id, existing_id);

    let second = contacts.next().unwrap().unwrap();
    assert_eq!(second.contact.id, existing_id);
    assert_eq!(second.contact.display_name.as_deref(), Some("Second Person"));
    assert_eq!(second.contact.note.as_deref(), Some("kept"));
}

#[test_log::test]
fn truncated_trailing_record_is_ignored() {
    let input = format!("{TWO_CARDS}BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Cut off\r\n");
    let contacts = import(&input, ConversionParameters::default());
    let names: Vec<_> = contacts
        .map(|c| c.unwrap().contact.display_name.unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["First Person", "Second Person"]);
}

struct CountingSource {
    remaining: usize,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl CardSource for CountingSource {
    fn next_card(&mut self) -> Result<Option<DecodedRecord>, ImportError> {
        if self.closed || self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(DecodedRecord {
            card: VCard::new(),
            warnings: Vec::new(),
            uid_hint: None,
        }))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn counting(remaining: usize) -> (ImportIterator<CountingSource>, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        remaining,
        closes: Arc::clone(&closes),
        closed: false,
    };
    let iter = ImportIterator::new(
        source,
        Arc::new(MappingRegistry::standard()),
        ConversionParameters::default().with_skip_validation(true),
    );
    (iter, closes)
}

#[test_log::test]
fn close_is_idempotent() {
    let (mut contacts, closes) = counting(3);
    assert!(contacts.next().is_some());

    contacts.close();
    contacts.close();
    assert_eq!(contacts.state(), ImportState::Closed);
    assert!(contacts.next().is_none());
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    drop(contacts);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn drop_releases_the_source() {
    let (mut contacts, closes) = counting(3);
    assert!(contacts.next().is_some());
    drop(contacts);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn exhaustion_releases_the_source() {
    let (contacts, closes) = counting(2);
    assert_eq!(contacts.count(), 2);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
