//! Emotion scoring backends for clinsight.
//!
//! This crate provides `EmotionModel` implementations: a keyword lexicon
//! scorer that works offline, and (behind the `remote` feature) a binding to
//! a hosted transformer classifier. Output parsing tolerates the surrounding
//! prose such services sometimes wrap around their JSON.

pub mod lexicon;
pub mod scoring;

#[cfg(feature = "remote")]
pub mod remote;

pub use lexicon::*;
pub use scoring::*;

#[cfg(feature = "remote")]
pub use remote::*;
