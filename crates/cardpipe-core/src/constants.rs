/// Product identifier written into exported vCards.
pub const PRODUCT_NAME: &str = "cardpipe";
pub const PRODID: &str = const_str::concat!("-//", PRODUCT_NAME, "//", env!("CARGO_PKG_VERSION"), "//EN");

/// Component name framed out of an import stream.
pub const VCARD_COMPONENT: &str = "VCARD";

/// Line buffer size before the framer flushes into the spill sink.
pub const DEFAULT_FLUSH_THRESHOLD_BYTES: usize = 64 * 1024;

/// In-memory bytes a spill sink keeps before moving to a temporary file.
pub const DEFAULT_SPILL_THRESHOLD_BYTES: usize = 1024 * 1024;

/// Prefix for environment variable overrides (`CARDPIPE__LIMITS__MAX_SIZE_BYTES`).
pub const ENV_PREFIX: &str = "CARDPIPE";

/// Optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "cardpipe.toml";
