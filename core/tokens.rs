use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use tiktoken_rs::{CoreBPE, cl100k_base};

static CL100K: Lazy<Result<CoreBPE, String>> = Lazy::new(|| cl100k_base().map_err(|e| e.to_string()));

// cl100k approximation; Gemini counts with its own tokenizer.
pub fn estimate_tokens(text: &str) -> Result<usize> {
    let bpe = CL100K
        .as_ref()
        .map_err(|e| AppError::TikToken(e.clone()))?;
    Ok(bpe.encode_ordinary(text).len())
}
