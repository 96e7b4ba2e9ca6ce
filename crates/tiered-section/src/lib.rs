//! Tiered Section Types
//!
//! Defines the atomic unit of tiered document content: a titled
//! [`Section`] with identity, provenance tier, content fingerprint and
//! override permission, plus the heading splitter that turns raw
//! markdown-like text into ordered [`RawSection`]s.

pub mod section;
pub mod split;
pub mod tier;

pub use section::{Fingerprint, Section, SectionMap};
pub use split::{split_sections, RawSection};
pub use tier::{Tier, TierParseError};

/// Separator between scope and title in composite identities.
pub const SCOPE_SEPARATOR: char = ':';

/// Deepest heading level recognised by the splitter.
pub const MAX_HEADING_LEVEL: u8 = 6;
