//! Context assembly
//!
//! Runs the intent matcher, invokes the matched tool and formats its result
//! for the model prompt. Failures never escape: they become a
//! [`ContextOutcome::Degraded`] reply.

mod assembler;
mod formatters;
mod recent;

pub use assembler::{ContextAssembler, ContextOutcome, DEGRADED_REPLY};
pub use formatters::{format_generic, Formatter, FormatterTable};
pub use recent::{artwork_records, RecentArtworks};
