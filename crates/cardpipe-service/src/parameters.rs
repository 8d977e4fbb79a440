use std::collections::BTreeSet;

use cardpipe_core::config::Settings;
use cardpipe_core::error::{CoreError, CoreResult};
use cardpipe_io::{FramerOptions, SizeLimit};
use cardpipe_rfc::vcard::VCardVersion;

/// Options for one import or export run.
///
/// ## Summary
/// Built from [`Settings`] with [`ConversionParameters::from_settings`] or
/// assembled with the `with_*` builders. A field allow-list restricts which
/// mappings run; names are vCard property names and compare case-insensitively.
#[derive(Debug, Clone)]
pub struct ConversionParameters {
    /// Export version; import fallback when a card declares none.
    pub version: VCardVersion,
    /// Reject unknown properties on export and report them on import.
    pub strict: bool,
    pub max_size: SizeLimit,
    /// Uppercase property names; `None` allows every mapping.
    pub fields: Option<BTreeSet<String>>,
    /// Merge into a supplied export template instead of starting empty.
    pub merge_template: bool,
    /// Keep a re-serialized copy of each imported card.
    pub retain_original: bool,
    pub skip_validation: bool,
    /// Fill a missing UID from the contact id.
    pub generate_uid: bool,
    pub flush_threshold: usize,
    pub spill_threshold: usize,
}

impl Default for ConversionParameters {
    fn default() -> Self {
        let framing = FramerOptions::default();
        Self {
            version: VCardVersion::V4,
            strict: false,
            max_size: SizeLimit::Unbounded,
            fields: None,
            merge_template: true,
            retain_original: false,
            skip_validation: false,
            generate_uid: false,
            flush_threshold: framing.flush_threshold,
            spill_threshold: framing.spill_threshold,
        }
    }
}

impl ConversionParameters {
    /// ## Summary
    /// Derives parameters from loaded settings.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if `format.version` is not a supported vCard version.
    pub fn from_settings(settings: &Settings) -> CoreResult<Self> {
        let version = VCardVersion::parse(&settings.format.version).ok_or_else(|| {
            CoreError::InvalidConfiguration {
                key: "format.version",
                message: format!(
                    "unsupported vCard version '{}', expected 3.0 or 4.0",
                    settings.format.version
                ),
            }
        })?;

        if settings.limits.spill_threshold_bytes == 0 {
            return Err(CoreError::InvalidConfiguration {
                key: "limits.spill_threshold_bytes",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            version,
            strict: settings.format.strict,
            max_size: SizeLimit::from_configured(settings.limits.max_size_bytes),
            skip_validation: !settings.format.validate,
            flush_threshold: settings.limits.flush_threshold_bytes,
            spill_threshold: settings.limits.spill_threshold_bytes,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_version(mut self, version: VCardVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, limit: impl Into<SizeLimit>) -> Self {
        self.max_size = limit.into();
        self
    }

    /// Restricts mappings to those owning at least one of `names`.
    #[must_use]
    pub fn with_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields = Some(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_uppercase())
                .filter(|name| !name.is_empty())
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn with_merge_template(mut self, merge: bool) -> Self {
        self.merge_template = merge;
        self
    }

    #[must_use]
    pub fn with_retain_original(mut self, retain: bool) -> Self {
        self.retain_original = retain;
        self
    }

    #[must_use]
    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    #[must_use]
    pub fn with_generate_uid(mut self, generate: bool) -> Self {
        self.generate_uid = generate;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, flush: usize, spill: usize) -> Self {
        self.flush_threshold = flush;
        self.spill_threshold = spill;
        self
    }

    /// Whether the allow-list admits the property `name`.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.fields
            .as_ref()
            .is_none_or(|fields| fields.contains(&name.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn framer_options(&self) -> FramerOptions {
        FramerOptions::default()
            .with_flush_threshold(self.flush_threshold)
            .with_spill_threshold(self.spill_threshold)
    }
}
