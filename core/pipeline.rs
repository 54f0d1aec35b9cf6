use crate::aggregate::{Aggregation, SkippedFile, aggregate};
use crate::collect::collect_candidates;
use crate::error::{AppError, Result};
use crate::filter::{FileFilter, SkipReason};
use crate::prompt::{Prompt, build_prompt};
use log;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Assembly {
    pub prompt: Prompt,
    pub aggregation: Aggregation,
    pub missing: Vec<SkippedFile>,
}

pub fn validate_question(question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "The question must not be empty.".to_string(),
        ));
    }
    Ok(())
}

pub fn assemble<P, Q>(
    question: &str,
    file_paths: &[P],
    dir_paths: &[Q],
    filter: &FileFilter,
) -> Result<Assembly>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    validate_question(question)?;

    let collected = collect_candidates(file_paths, dir_paths);
    log::debug!(
        "Collected {} candidates ({} missing arguments)",
        collected.candidates.len(),
        collected.missing.len()
    );

    let aggregation = aggregate(&collected.candidates, filter);
    let blocks = aggregation.blocks();
    let prompt = build_prompt(question, blocks.as_slice());

    Ok(Assembly {
        prompt,
        aggregation,
        missing: collected
            .missing
            .into_iter()
            .map(|path| SkippedFile {
                path,
                reason: SkipReason::NotFound,
            })
            .collect(),
    })
}
