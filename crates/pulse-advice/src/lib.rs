//! Trading advice for agentpulse.
//!
//! Sends the ranked signals, one summary line each, to an
//! OpenAI-compatible chat completions endpoint and returns the text.
//! Advice is best effort: any failure is replaced by a fixed note and
//! never affects the numeric signals.

pub mod advisor;
pub mod config;
pub mod error;
pub mod prompt;

pub use advisor::{
    advise_or_fallback, AdviceGenerator, ChatAdvisor, MockAdvisor, FALLBACK_ADVICE,
    NO_ADVICE,
};
pub use config::AdviceConfig;
pub use error::{AdviceError, AdviceResult};
pub use prompt::{build_prompt, format_signals, PROMPT_PREAMBLE};
