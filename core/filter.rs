use crate::collect::FileCandidate;
use log;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const SAMPLE_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NotFound,
    ExcludedExtension,
    ExcludedName,
    Binary,
    Unreadable,
    BudgetExceeded,
}

impl SkipReason {
    pub fn as_tag(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not-found",
            SkipReason::ExcludedExtension => "excluded-extension",
            SkipReason::ExcludedName => "excluded-name",
            SkipReason::Binary => "binary",
            SkipReason::Unreadable => "unreadable",
            SkipReason::BudgetExceeded => "budget-exceeded",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Include,
    Exclude(SkipReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    excluded_extensions: BTreeSet<String>,
    excluded_names: BTreeSet<String>,
    max_bytes: Option<u64>,
}

impl FilterConfig {
    pub fn new<E, N>(exclude_ext: E, exclude_name: N, max_bytes: Option<u64>) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let excluded_extensions = exclude_ext
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        let excluded_names = exclude_name
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self {
            excluded_extensions,
            excluded_names,
            max_bytes,
        }
    }

    pub fn excluded_extensions(&self) -> impl Iterator<Item = &str> {
        self.excluded_extensions.iter().map(String::as_str)
    }

    pub fn excluded_names(&self) -> impl Iterator<Item = &str> {
        self.excluded_names.iter().map(String::as_str)
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    pub fn is_extension_excluded(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .is_some_and(|ext| self.excluded_extensions.contains(&ext))
    }

    pub fn is_name_excluded(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.excluded_names.contains(&*name.to_string_lossy()))
    }
}

pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

// A multi-byte sequence cut off at the end of the sample is not an error.
pub fn is_binary(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        Err(e) => e.error_len().is_some(),
    }
}

#[derive(Debug, Clone)]
pub struct FileFilter {
    config: FilterConfig,
}

impl FileFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn check_rules(&self, candidate: &FileCandidate) -> Option<SkipReason> {
        if self.config.is_extension_excluded(&candidate.path) {
            log::debug!("Excluded by extension: {}", candidate);
            return Some(SkipReason::ExcludedExtension);
        }
        if self.config.is_name_excluded(&candidate.path) {
            log::debug!("Excluded by name: {}", candidate);
            return Some(SkipReason::ExcludedName);
        }
        None
    }

    pub fn classify_sample(&self, candidate: &FileCandidate, sample: &[u8]) -> Decision {
        if let Some(reason) = self.check_rules(candidate) {
            return Decision::Exclude(reason);
        }
        if is_binary(sample) {
            log::warn!("Skipping binary file: {}", candidate);
            return Decision::Exclude(SkipReason::Binary);
        }
        Decision::Include
    }

    pub fn evaluate(&self, candidate: &FileCandidate) -> Decision {
        if let Some(reason) = self.check_rules(candidate) {
            return Decision::Exclude(reason);
        }
        match read_sample(&candidate.path) {
            Ok(sample) => self.classify_sample(candidate, &sample),
            Err(e) => {
                log::warn!("Skipping unreadable file {}: {}", candidate, e);
                Decision::Exclude(SkipReason::Unreadable)
            }
        }
    }
}

fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn filter(exts: &[&str], names: &[&str]) -> FileFilter {
        FileFilter::new(FilterConfig::new(exts, names, None))
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("png"), Some(".png".to_string()));
        assert_eq!(normalize_extension(".PNG"), Some(".png".to_string()));
        assert_eq!(normalize_extension("  .Rs "), Some(".rs".to_string()));
        assert_eq!(normalize_extension("."), None);
        assert_eq!(normalize_extension(""), None);
    }

    #[test]
    fn test_is_binary() {
        assert!(!is_binary(b""));
        assert!(!is_binary(b"plain text\n"));
        assert!(!is_binary("héllo wörld".as_bytes()));
        assert!(is_binary(b"abc\0def"));
        assert!(is_binary(&[0xff, 0xfe, 0x41]));
    }

    #[test]
    fn test_truncated_multibyte_sample_is_text() {
        let text = "aé";
        let bytes = text.as_bytes();
        // Drop the last byte of the two-byte 'é'.
        assert!(!is_binary(&bytes[..bytes.len() - 1]));
    }

    #[test]
    fn test_excluded_extension_wins_regardless_of_content() {
        let f = filter(&[".png", "TXT"], &[]);
        let candidate = FileCandidate::explicit("notes.Txt");
        assert_eq!(
            f.classify_sample(&candidate, b"perfectly good text"),
            Decision::Exclude(SkipReason::ExcludedExtension)
        );
        let png = FileCandidate::explicit("img/logo.PNG");
        assert_eq!(
            f.classify_sample(&png, b"\x89PNG\r\n\x1a\n\0\0"),
            Decision::Exclude(SkipReason::ExcludedExtension)
        );
    }

    #[test]
    fn test_excluded_name_is_exact() {
        let f = filter(&[], &["secret.txt"]);
        assert_eq!(
            f.classify_sample(&FileCandidate::explicit("dir/secret.txt"), b"x"),
            Decision::Exclude(SkipReason::ExcludedName)
        );
        assert_eq!(
            f.classify_sample(&FileCandidate::explicit("dir/Secret.txt"), b"x"),
            Decision::Include
        );
        assert_eq!(
            f.classify_sample(&FileCandidate::explicit("dir/secret.txt.bak"), b"x"),
            Decision::Include
        );
    }

    #[test]
    fn test_binary_is_excluded_even_without_rules() {
        let f = filter(&[], &[]);
        assert_eq!(
            f.classify_sample(&FileCandidate::explicit("data.bin"), b"\0\0\0"),
            Decision::Exclude(SkipReason::Binary)
        );
    }

    #[test]
    fn test_files_without_extension_are_not_extension_excluded() {
        let f = filter(&[".env"], &[]);
        assert_eq!(
            f.classify_sample(&FileCandidate::explicit("Makefile"), b"all:"),
            Decision::Include
        );
    }

    #[test]
    fn test_evaluate_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let text = tmp.path().join("a.txt");
        let bin = tmp.path().join("b.dat");
        fs::write(&text, "hello").unwrap();
        fs::write(&bin, [1u8, 0, 2, 3]).unwrap();

        let f = filter(&[], &[]);
        assert_eq!(f.evaluate(&FileCandidate::explicit(&text)), Decision::Include);
        assert_eq!(
            f.evaluate(&FileCandidate::explicit(&bin)),
            Decision::Exclude(SkipReason::Binary)
        );
        assert_eq!(
            f.evaluate(&FileCandidate::explicit(tmp.path().join("gone.txt"))),
            Decision::Exclude(SkipReason::Unreadable)
        );
    }

    #[test]
    fn test_skip_reason_tags() {
        assert_eq!(SkipReason::ExcludedExtension.to_string(), "excluded-extension");
        assert_eq!(SkipReason::ExcludedName.to_string(), "excluded-name");
        assert_eq!(SkipReason::Binary.to_string(), "binary");
        assert_eq!(SkipReason::Unreadable.to_string(), "unreadable");
    }
}
