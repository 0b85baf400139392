//! The Celeste request pipeline.
//!
//! Each request runs strictly in order:
//!
//! 1. **Extract** the location a query mentions ([`LocationExtractor`])
//! 2. **Assemble** persona, date, and optional weather context ([`ContextAssembler`])
//! 3. **Respond** with the persona's reply, seeded with prior turns ([`ResponseGenerator`])
//!
//! No state is kept between requests; history is supplied by the caller.

pub mod assembler;
pub mod extractor;
pub mod pipeline;
pub mod responder;

#[cfg(test)]
mod test_helpers;

pub use assembler::{AssembledContext, AssemblyInput, ContextAssembler};
pub use extractor::LocationExtractor;
pub use pipeline::{Answer, AskInput, Celeste};
pub use responder::{FALLBACK_REPLY, ResponseGenerator};
