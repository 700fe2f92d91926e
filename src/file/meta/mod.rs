//! Decoded payloads of structured meta messages

mod smpte_offset;
pub use smpte_offset::*;
