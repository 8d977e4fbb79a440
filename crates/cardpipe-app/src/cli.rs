use std::path::PathBuf;

use cardpipe_rfc::vcard::VCardVersion;
use cardpipe_service::ConversionParameters;
use clap::{Args, Parser, Subcommand};

/// Streams vCards into JSON contacts and back.
#[derive(Debug, Parser)]
#[command(name = "cardpipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a vCard file, writing one JSON line per contact.
    Import(ImportArgs),

    /// Export JSON contacts as vCards.
    Export(ExportArgs),

    /// List the field mappings and the properties they own.
    Fields,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// vCard file to read, or `-` for stdin.
    pub file: PathBuf,

    /// Only map these vCard properties (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Attach a re-serialized copy of each card and its `ETag`.
    #[arg(long)]
    pub keep_original: bool,

    /// Fail once the input exceeds this many bytes.
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Skip per-card validation warnings.
    #[arg(long)]
    pub skip_validation: bool,

    /// Report properties unknown to the card's version.
    #[arg(long)]
    pub strict: bool,
}

impl ImportArgs {
    /// Overlays the flags onto configured parameters.
    #[must_use]
    pub fn apply(&self, mut params: ConversionParameters) -> ConversionParameters {
        if !self.fields.is_empty() {
            params = params.with_fields(&self.fields);
        }
        if self.max_size.is_some() {
            params = params.with_max_size(self.max_size);
        }
        params.retain_original |= self.keep_original;
        params.skip_validation |= self.skip_validation;
        params.strict |= self.strict;
        params
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// JSON-lines contacts to read, or `-` for stdin. Lines written by
    /// `cardpipe import` are accepted as they are.
    pub file: PathBuf,

    /// vCard version to write.
    #[arg(long, value_parser = parse_version)]
    pub version: Option<VCardVersion>,

    /// Refuse properties the target version does not define.
    #[arg(long)]
    pub strict: bool,

    /// Only write these vCard properties (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Write a UID derived from the contact id when a contact has none.
    #[arg(long)]
    pub generate_uid: bool,
}

impl ExportArgs {
    #[must_use]
    pub fn apply(&self, mut params: ConversionParameters) -> ConversionParameters {
        if let Some(version) = self.version {
            params = params.with_version(version);
        }
        if !self.fields.is_empty() {
            params = params.with_fields(&self.fields);
        }
        params.strict |= self.strict;
        params.generate_uid |= self.generate_uid;
        params
    }
}

fn parse_version(value: &str) -> Result<VCardVersion, String> {
    VCardVersion::parse(value)
        .ok_or_else(|| format!("unsupported vCard version '{value}', expected 3.0 or 4.0"))
}
