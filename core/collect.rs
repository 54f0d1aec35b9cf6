use log;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Explicit,
    DirectoryWalk { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub origin: Origin,
}

impl FileCandidate {
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: Origin::Explicit,
        }
    }

    pub fn discovered(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: Origin::DirectoryWalk { root: root.into() },
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Display for FileCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Collected {
    pub candidates: Vec<FileCandidate>,
    pub missing: Vec<PathBuf>,
}

pub fn collect_candidates<P, Q>(file_paths: &[P], dir_paths: &[Q]) -> Collected
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut collected = Collected::default();

    for file_path in file_paths {
        let file_path = file_path.as_ref();
        if file_path.is_file() {
            log::trace!("Explicit file candidate: {}", file_path.display());
            collected
                .candidates
                .push(FileCandidate::explicit(file_path));
        } else {
            log::warn!(
                "File not found or is not a regular file: {}",
                file_path.display()
            );
            collected.missing.push(file_path.to_path_buf());
        }
    }

    for dir_path in dir_paths {
        let dir_path = dir_path.as_ref();
        if !dir_path.is_dir() {
            log::warn!("Directory not found: {}", dir_path.display());
            collected.missing.push(dir_path.to_path_buf());
            continue;
        }
        let before = collected.candidates.len();
        walk_directory(dir_path, &mut collected.candidates);
        log::debug!(
            "Found {} files under {}",
            collected.candidates.len() - before,
            dir_path.display()
        );
    }

    collected
}

fn walk_directory(root: &Path, out: &mut Vec<FileCandidate>) {
    log::info!("Walking directory: {}", root.display());
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry_result in walker {
        match entry_result {
            Ok(entry) => {
                // Symlinked files are kept; symlinked directories are not descended.
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if is_file {
                    log::trace!("Walked file: {}", entry.path().display());
                    out.push(FileCandidate::discovered(entry.path(), root));
                }
            }
            Err(e) => {
                log::warn!("Error walking directory {}: {}", root.display(), e);
            }
        }
    }
}
