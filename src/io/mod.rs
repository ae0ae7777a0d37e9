//! Audio input types
//!
//! Decoding happens outside this crate; callers hand over decoded PCM.

pub mod sample_buffer;
