//! Call flow for the outbound IVR agent
//!
//! The flow is a state machine over webhook steps:
//!
//! ```text
//! Greeting -> AwaitName -> [AskEmail -> AwaitEmail] -> AskBloodGroup -> AwaitBloodGroup
//!          -> AwaitFollowupConsent -> AwaitQuestion -> AwaitMoreQuestionsConsent -> ThankYou
//! ```
//!
//! No state is kept between requests. Each response embeds the collected
//! values in the URLs it redirects or posts to (see [`FlowContext`]).

pub mod context;
pub mod controller;
pub mod error;
pub mod gather;
pub mod step;

pub use context::{FlowContext, CONTEXT_VERSION};
pub use controller::CallFlow;
pub use error::FlowError;
pub use gather::{GatherOutcome, GatherPolicy};
pub use step::Step;
