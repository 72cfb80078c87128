//! Veder engine core: configuration, the generative client seam, prompts and
//! query orchestration on top of the `veder-shared` pipeline.

pub mod config;
pub mod engine;
pub mod guard;
pub mod llm_client;
pub mod prompts;

pub use config::Config;
pub use engine::{ResearchEngine, Submission};
pub use guard::{LatestReport, QueryState, SequenceGuard, Ticket};
pub use llm_client::{
    FakeGenerativeClient, FakeReply, GenerationOutput, GenerationRequest, GenerativeClient, HttpGenerativeClient,
};
