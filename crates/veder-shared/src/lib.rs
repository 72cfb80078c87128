//! Shared types and the response pipeline for Veder.
//!
//! Raw model text flows through `normalizer::normalize` into a JSON value and
//! then through `materializer::materialize` into a fully defaulted `Report`.

pub mod error;
pub mod grounding;
pub mod market;
pub mod materializer;
pub mod normalizer;
pub mod report;
pub mod validation;

pub use error::{Result, VederError};
pub use grounding::{extract_sources, GroundingChunk, WebSource};
pub use market::{MarketIntelligence, NewToken};
pub use materializer::{materialize, materialize_market, materialize_with_sources, Materialize};
pub use normalizer::normalize;
pub use report::{DimensionStatus, Language, Report, SourceLink, Verdict};
