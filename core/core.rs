pub mod aggregate;
pub mod collect;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod gemini;
pub mod pipeline;
pub mod prompt;
pub mod tokens;

pub use aggregate::{Aggregation, BudgetNotice, IncludedFile, SkippedFile, aggregate, format_block};
pub use collect::{Collected, FileCandidate, Origin, collect_candidates};
pub use config::{Config, parse_byte_size};
pub use credentials::{ApiKey, default_env_files, resolve_api_key};
pub use dispatch::{Dispatch, DispatchOptions, ModelClient, ModelResponse, TokenUsage, dispatch};
pub use error::{AppError, Result};
pub use filter::{Decision, FileFilter, FilterConfig, SkipReason, is_binary};
pub use gemini::GeminiClient;
pub use pipeline::{Assembly, assemble, validate_question};
pub use prompt::{Prompt, build_prompt};
pub use tokens::estimate_tokens;
