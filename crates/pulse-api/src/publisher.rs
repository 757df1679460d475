//! Cycle sink feeding the response surface.

use crate::state::ApiState;
use crate::types::{AnalysisResponse, ErrorResponse};
use pulse_advice::{advise_or_fallback, AdviceGenerator, NO_ADVICE};
use pulse_core::{BoxFuture, CycleResult};
use pulse_engine::CycleSink;
use std::sync::Arc;
use tracing::debug;

/// Turns each finished cycle into the response the surface will serve.
///
/// Total-failure cycles are published as an error and never reach the
/// advice generator. Without a generator the advice text is
/// `No advice generated`.
pub struct AnalysisPublisher {
    state: ApiState,
    advisor: Option<Arc<dyn AdviceGenerator>>,
}

impl AnalysisPublisher {
    pub fn new(state: ApiState, advisor: Option<Arc<dyn AdviceGenerator>>) -> Self {
        Self { state, advisor }
    }

    pub async fn publish_cycle(&self, result: &CycleResult) {
        if result.is_total_failure() {
            self.state
                .publish_failure(ErrorResponse::total_failure(result), result.finished_at);
            return;
        }

        let advice = match &self.advisor {
            Some(advisor) => advise_or_fallback(advisor.as_ref(), &result.signals).await,
            None => NO_ADVICE.to_string(),
        };
        debug!(cycle = result.cycle, chars = advice.len(), "Publishing analysis");
        self.state
            .publish_analysis(AnalysisResponse::from_cycle(result, advice));
    }
}

impl CycleSink for AnalysisPublisher {
    fn publish<'a>(&'a self, result: &'a CycleResult) -> BoxFuture<'a, ()> {
        Box::pin(self.publish_cycle(result))
    }
}
