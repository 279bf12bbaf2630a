//! Pure Rust async implementation of the [SA-MP Query Mechanism](https://sampwiki.blast.hk/wiki/Query_Mechanism)
pub mod error;
pub mod info;
pub mod packet;
mod parse;
pub mod query;
