//! Stream URL inspection: role classification, pairing and normalization.
//!
//! Source URLs are copied from a browser's network inspector. Each one points
//! at a single elementary stream (video-only or audio-only) and carries a
//! base64 encoded `efg` query parameter describing the encode. This module
//! reads that metadata to tell the two streams apart and strips the byte-range
//! parameters the player added so the full resource is requested.

mod classify;
mod normalize;

pub use classify::{classify, pair_streams, validate_pair, Pairing, PairingError, StreamPair, StreamRole};
pub use normalize::{normalize_url, RANGE_PARAMS};
