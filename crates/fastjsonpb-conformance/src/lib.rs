//! Codecs generated at build time from `schema/example.json`.

/// Types of the `example` package.
#[allow(missing_docs, clippy::all, clippy::pedantic)]
pub mod example {
    include!(concat!(env!("OUT_DIR"), "/example.fastjsonpb.rs"));
}
