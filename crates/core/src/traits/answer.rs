//! Question answering trait

use async_trait::async_trait;

use crate::Result;

/// Answers a caller's question in the call language
///
/// Implementations decide the scope of the answer (open domain or a fixed
/// knowledge base); the call flow only sees text in and text out.
#[async_trait]
pub trait AnswerEngine: Send + Sync + 'static {
    /// Produce a short spoken answer to an English question
    async fn answer(&self, question: &str) -> Result<String>;

    /// Engine name for logging and metrics
    fn name(&self) -> &str;
}
