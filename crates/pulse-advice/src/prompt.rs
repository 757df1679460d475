//! Prompt construction.

use pulse_core::MarketSignal;

/// Instruction placed before the signal summary.
pub const PROMPT_PREAMBLE: &str = "Analyze these AI agent market signals and provide 3-5 clear, actionable bullet points for a DeFi trader. Focus on the highest confidence signals and potential risks:";

/// One summary line per signal, newline-joined, in the given order.
pub fn format_signals(signals: &[MarketSignal]) -> String {
    signals
        .iter()
        .map(MarketSignal::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(signals: &[MarketSignal]) -> String {
    format!("{PROMPT_PREAMBLE}\n\n{}", format_signals(signals))
}
