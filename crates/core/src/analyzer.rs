//! The signal extraction boundary.
//!
//! The engine never looks at raw text itself; it asks an analyzer for a
//! [`SignalBundle`]. Implementations may be local heuristics or a remote NLP
//! service, hence the async signature.

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::signal::SignalBundle;

#[async_trait]
pub trait SignalAnalyzer: Send + Sync {
    /// Analyze `text`. `active_contexts` is copied into the bundle so that
    /// scoring can react to context.
    async fn analyze(
        &self,
        text: &str,
        active_contexts: &[String],
    ) -> Result<SignalBundle, AnalysisError>;
}
