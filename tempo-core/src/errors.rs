//! Error Types for Store Persistence and Aggregation
//!
//! ## Design Philosophy
//!
//! Errors here follow the rules the rest of the crate lives by:
//!
//! 1. **Small Size**: Every variant is inline data only (at most a
//!    `&'static str` reason), so errors stay Copy and cheap to return from
//!    the save/archive hot path.
//!
//! 2. **No Heap Allocation**: No String payloads. Context that would need
//!    allocation (the document key, the series name) is known at the call
//!    site and belongs in the log line, not the error value.
//!
//! 3. **Recoverable by Contract**: Almost everything is recovered at the
//!    boundary that detects it. A missing or undecodable document means
//!    "start empty"; a failed write means "keep memory, retry next cycle".
//!    Only [`TotalsError::MissingSegmentMarker`] is surfaced to callers,
//!    because it indicates a sequencing bug rather than a data condition.
//!
//! ## Error Categories
//!
//! ### Persistence ([`VaultError`])
//! - `Missing`: no document under the requested key
//! - `Decode` / `Encode`: document bytes and the codec disagree
//! - `Read` / `Write`: the backing store itself failed
//!
//! ### Aggregation ([`TotalsError`])
//! - `MissingSegmentMarker`: totals were requested without a resolvable
//!   segment context; the call returns nothing rather than partial totals
//!
//! Empty-store lookups are not errors at all; they are `None`.

use thiserror_no_std::Error;

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Result type for aggregation operations
pub type TotalsResult<T> = Result<T, TotalsError>;

/// Persistence errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultError {
    /// No document stored under the requested key
    #[error("Document missing")]
    Missing,

    /// Stored bytes could not be decoded into the expected shape
    #[error("Decode failed: {reason}")]
    Decode {
        /// Codec or shape check that rejected the document
        reason: &'static str,
    },

    /// Value could not be encoded into document bytes
    #[error("Encode failed: {reason}")]
    Encode {
        /// Codec that rejected the value
        reason: &'static str,
    },

    /// Backing store failed while reading
    #[error("Read failed: {reason}")]
    Read {
        /// Backend-specific failure class
        reason: &'static str,
    },

    /// Backing store failed while writing
    #[error("Write failed: {reason}")]
    Write {
        /// Backend-specific failure class
        reason: &'static str,
    },
}

/// Aggregation errors surfaced to callers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsError {
    /// Totals were requested without a segment marker in effect
    #[error("No segment marker in effect at the requested horizon")]
    MissingSegmentMarker,
}

#[cfg(feature = "defmt")]
impl defmt::Format for VaultError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Missing => defmt::write!(fmt, "Document missing"),
            Self::Decode { reason } => defmt::write!(fmt, "Decode failed: {}", reason),
            Self::Encode { reason } => defmt::write!(fmt, "Encode failed: {}", reason),
            Self::Read { reason } => defmt::write!(fmt, "Read failed: {}", reason),
            Self::Write { reason } => defmt::write!(fmt, "Write failed: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TotalsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MissingSegmentMarker => defmt::write!(fmt, "No segment marker in effect"),
        }
    }
}

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub(crate) use log_warn;
