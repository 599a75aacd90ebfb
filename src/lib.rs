//! AI service core of a brand-kit design assistant
//!
//! Extracts brand profiles from text, websites or screenshots, generates
//! on-brand design prompts, surfaces design trends and audits designs, all
//! through a hosted Groq model behind moderation, retries and a TTL cache.

pub mod ai;
pub mod app;
pub mod assistant;
pub mod cache;
pub mod cancel;
pub mod error;
pub mod models;
pub mod moderation;
pub mod prompts;
pub mod retry;
pub mod sandbox;
pub mod screenshot;
pub mod storage;
pub mod validate;

pub use assistant::{AssistantServices, BrandAssistant};
pub use cancel::{CancelHandle, CancelSignal};
pub use error::{Error, Result};
