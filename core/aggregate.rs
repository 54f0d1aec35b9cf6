use crate::collect::FileCandidate;
use crate::filter::{Decision, FileFilter, SkipReason};
use log;
use std::fs;
use std::path::PathBuf;

pub const BLOCK_HEADER_PREFIX: &str = "File: ";
pub const BLOCK_DELIMITER: &str = "\"\"\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedFile {
    pub candidate: FileCandidate,
    pub content: String,
    pub size: u64,
}

impl IncludedFile {
    pub fn new(candidate: FileCandidate, content: String) -> Self {
        let size = content.len() as u64;
        Self {
            candidate,
            content,
            size,
        }
    }

    pub fn to_block(&self) -> String {
        format_block(&self.candidate.display_path(), &self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetNotice {
    pub limit: u64,
    pub first_rejected: PathBuf,
    pub would_be_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub files: Vec<IncludedFile>,
    pub skipped: Vec<SkippedFile>,
    pub total_bytes: u64,
    pub budget: Option<BudgetNotice>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.files.iter().map(IncludedFile::to_block).collect()
    }

    fn skip(&mut self, candidate: &FileCandidate, reason: SkipReason) {
        self.skipped.push(SkippedFile {
            path: candidate.path.clone(),
            reason,
        });
    }
}

pub fn format_block(path: &str, content: &str) -> String {
    let mut block = String::with_capacity(path.len() + content.len() + 16);
    block.push_str(BLOCK_HEADER_PREFIX);
    block.push_str(path);
    block.push('\n');
    block.push_str(BLOCK_DELIMITER);
    block.push('\n');
    block.push_str(content);
    if !content.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(BLOCK_DELIMITER);
    block
}

// Stops at the first file that would exceed the budget; later candidates are never read.
pub fn aggregate(candidates: &[FileCandidate], filter: &FileFilter) -> Aggregation {
    let budget = filter.config().max_bytes();
    let mut aggregation = Aggregation::default();

    log::debug!(
        "Aggregating {} candidates (budget: {:?})",
        candidates.len(),
        budget
    );

    for candidate in candidates {
        if let Decision::Exclude(reason) = filter.evaluate(candidate) {
            aggregation.skip(candidate, reason);
            continue;
        }

        let content = match fs::read(&candidate.path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping file with encoding issues: {} ({})", candidate, e);
                    aggregation.skip(candidate, SkipReason::Unreadable);
                    continue;
                }
            },
            Err(e) => {
                log::warn!("Error reading file {}: {}", candidate, e);
                aggregation.skip(candidate, SkipReason::Unreadable);
                continue;
            }
        };

        let size = content.len() as u64;
        let would_be_total = aggregation.total_bytes.saturating_add(size);
        if let Some(limit) = budget {
            if would_be_total > limit {
                log::warn!(
                    "Skipping {} and all remaining files: {} bytes would exceed the {} byte limit",
                    candidate,
                    would_be_total,
                    limit
                );
                aggregation.skip(candidate, SkipReason::BudgetExceeded);
                aggregation.budget = Some(BudgetNotice {
                    limit,
                    first_rejected: candidate.path.clone(),
                    would_be_total,
                });
                break;
            }
        }

        log::trace!("Including {} ({} bytes)", candidate, size);
        aggregation.total_bytes = would_be_total;
        aggregation
            .files
            .push(IncludedFile::new(candidate.clone(), content));
    }

    log::info!(
        "Included {} files ({} bytes), skipped {}",
        aggregation.files.len(),
        aggregation.total_bytes,
        aggregation.skipped.len()
    );
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn no_rules(max_bytes: Option<u64>) -> FileFilter {
        FileFilter::new(FilterConfig::new(
            Vec::<String>::new(),
            Vec::<String>::new(),
            max_bytes,
        ))
    }

    fn write(dir: &Path, name: &str, content: &[u8]) -> FileCandidate {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        FileCandidate::explicit(path)
    }

    #[test]
    fn test_format_block_exact() {
        assert_eq!(
            format_block("a.txt", "hello\n"),
            "File: a.txt\n\"\"\"\nhello\n\"\"\""
        );
        assert_eq!(format_block("b.txt", "x"), "File: b.txt\n\"\"\"\nx\n\"\"\"");
    }

    #[test]
    fn test_excluded_extension_is_left_out() {
        let tmp = TempDir::new().unwrap();
        let png = write(tmp.path(), "image.png", b"not really a png");
        let txt = write(tmp.path(), "note.txt", b"x");
        let filter = FileFilter::new(FilterConfig::new([".png"], Vec::<String>::new(), None));

        let agg = aggregate(&[png.clone(), txt.clone()], &filter);

        assert_eq!(agg.files.len(), 1);
        assert_eq!(agg.files[0].candidate, txt);
        assert_eq!(agg.files[0].content, "x");
        assert_eq!(
            agg.skipped,
            vec![SkippedFile {
                path: png.path,
                reason: SkipReason::ExcludedExtension
            }]
        );
        assert!(agg.budget.is_none());
    }

    #[test]
    fn test_budget_stops_without_partial_inclusion() {
        let tmp = TempDir::new().unwrap();
        let first = write(tmp.path(), "ten.txt", &[b'a'; 10]);
        let second = write(tmp.path(), "twenty.txt", &[b'b'; 20]);

        let agg = aggregate(&[first.clone(), second.clone()], &no_rules(Some(15)));

        assert_eq!(agg.files.len(), 1);
        assert_eq!(agg.files[0].candidate, first);
        assert_eq!(agg.total_bytes, 10);
        assert_eq!(
            agg.budget,
            Some(BudgetNotice {
                limit: 15,
                first_rejected: second.path.clone(),
                would_be_total: 30,
            })
        );
        assert_eq!(agg.skipped[0].reason, SkipReason::BudgetExceeded);
    }

    #[test]
    fn test_budget_includes_longest_fitting_prefix_only() {
        let tmp = TempDir::new().unwrap();
        let sizes = [4usize, 3, 5, 1, 1];
        let candidates: Vec<FileCandidate> = sizes
            .iter()
            .enumerate()
            .map(|(i, n)| write(tmp.path(), &format!("f{}.txt", i), &vec![b'z'; *n]))
            .collect();

        // 4 + 3 = 7 fits, + 5 = 12 does not; the trailing 1-byte files would
        // fit on their own but must not be included after the overflow.
        let agg = aggregate(&candidates, &no_rules(Some(10)));

        assert_eq!(agg.files.len(), 2);
        assert_eq!(agg.total_bytes, 7);
        assert_eq!(agg.skipped.len(), 1);

        // Exactly reaching the budget is allowed.
        let agg = aggregate(&candidates, &no_rules(Some(12)));
        assert_eq!(agg.files.len(), 3);
        assert_eq!(agg.total_bytes, 12);
        assert_eq!(agg.skipped.len(), 1);
        assert_eq!(agg.skipped[0].path, candidates[3].path);
    }

    #[test]
    fn test_zero_budget_yields_empty_aggregation() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a.txt", b"a");
        let agg = aggregate(&[a], &no_rules(Some(0)));
        assert!(agg.is_empty());
        assert!(agg.budget.is_some());
    }

    #[test]
    fn test_invalid_utf8_after_sample_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; 2048];
        bytes.push(0xff);
        let late = write(tmp.path(), "late.txt", &bytes);
        let ok = write(tmp.path(), "ok.txt", b"fine");

        let agg = aggregate(&[late.clone(), ok.clone()], &no_rules(None));

        assert_eq!(agg.files.len(), 1);
        assert_eq!(agg.files[0].candidate, ok);
        assert_eq!(agg.skipped[0].reason, SkipReason::Unreadable);
    }

    #[test]
    fn test_size_counts_bytes_not_chars() {
        let tmp = TempDir::new().unwrap();
        let f = write(tmp.path(), "u.txt", "é".as_bytes());
        let agg = aggregate(&[f], &no_rules(None));
        assert_eq!(agg.files[0].size, 2);
        assert_eq!(agg.total_bytes, 2);
    }
}
