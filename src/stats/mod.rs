//! Stats module - Top-N rankings over the latest snapshot

mod ranking;

pub use ranking::{RankedEntry, Ranking};
