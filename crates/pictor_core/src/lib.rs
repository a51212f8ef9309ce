//! Core types shared across the Pictor workspace.
//!
//! - [`Clock`] abstracts the wall clock so eviction and metadata stamping can
//!   be driven deterministically ([`ManualClock`]) in tests.
//! - [`unique_filename`] issues `{uuid}.{ext}` names for stored images and
//!   derivatives.
//! - [`ImageEncoding`] names the two derivative encodings.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod encoding;
mod naming;

pub use clock::{Clock, ManualClock, SystemClock};
pub use encoding::ImageEncoding;
pub use naming::{file_stem, unique_filename};
