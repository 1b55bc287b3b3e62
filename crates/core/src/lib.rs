//! billing-core: Shared types and text utilities for the billing assistant
//!
//! This crate holds everything in the question-answering cycle that does not
//! touch the network: date normalization, answer sanitizing, prompt templates,
//! result formatting and the per-user conversation window.

pub mod dates;
pub mod error;
pub mod memory;
pub mod prompt;
pub mod question;
pub mod result;
pub mod sanitize;
pub mod table;

pub use dates::normalize_dates;
pub use error::BillingError;
pub use memory::{ConversationMemory, Exchange};
pub use prompt::{PromptInputs, PromptTemplate, extract_sql};
pub use question::Question;
pub use result::{PipelineResult, ResultFormat};
pub use sanitize::sanitize_answer;
pub use table::ResultTable;
