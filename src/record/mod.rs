//! Tracked records.
//!
//! A [`TrackedRecord`] mirrors one remote record and turns field writes into
//! the smallest create/update/delete that persists them.

mod buffer;
mod tracked;
mod typed;

pub use buffer::MutationBuffer;
pub use tracked::{SaveOutcome, TrackedRecord};
pub use typed::{fetch_typed, merge, typed_list, TypedRecord};
