use crate::error::{NoteCryptError, Result};
use git2::{Delta, DiffOptions, Repository};
use std::path::{Path, PathBuf};

// Index mode of a submodule entry; there is no blob behind it
const GITLINK_MODE: u32 = 0o160000;

/// Source of the paths a commit is about to include, and of their content
pub trait StagedFiles {
    /// Paths relative to the repository root
    fn staged_files(&self) -> Result<Vec<String>>;

    /// Content of `path` as staged; `None` when the index has no blob for it
    fn staged_content(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open the repository containing `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| NoteCryptError::NotInGitRepo)?;
        Ok(Self { repo })
    }

    /// Get the git directory path
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get repository root path
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(NoteCryptError::Other(
            "Repository has no working directory".into(),
        ))
    }

    /// Hooks directory, honouring `core.hooksPath`
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let config = self.repo.config()?;
        match config.get_path("core.hooksPath") {
            Ok(custom) if custom.is_absolute() => Ok(custom),
            Ok(custom) => Ok(self.workdir()?.join(custom)),
            Err(_) => Ok(self.git_dir().join("hooks")),
        }
    }
}

impl StagedFiles for GitRepo {
    /// Index entries that differ from HEAD and carry content: added, copied,
    /// modified and the new side of renames. Deletions are left out.
    fn staged_files(&self) -> Result<Vec<String>> {
        // Unborn branch: everything in the index is new
        let head_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(_) => None,
        };

        let mut index = self.repo.index()?;
        index.read(false)?;
        let mut opts = DiffOptions::new();
        opts.include_typechange(true);
        let mut diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), Some(&mut opts))?;
        diff.find_similar(None)?;

        let files = diff
            .deltas()
            .filter(|delta| {
                matches!(
                    delta.status(),
                    Delta::Added | Delta::Copied | Delta::Modified | Delta::Renamed | Delta::Typechange
                )
            })
            .filter_map(|delta| delta.new_file().path().map(|p| p.to_string_lossy().into_owned()))
            .collect::<Vec<_>>();

        tracing::debug!(count = files.len(), "listed staged files");
        Ok(files)
    }

    fn staged_content(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut index = self.repo.index()?;
        index.read(false)?;

        let Some(entry) = index.get_path(Path::new(path), 0) else {
            return Ok(None);
        };
        if entry.mode == GITLINK_MODE {
            return Ok(None);
        }

        let blob = self.repo.find_blob(entry.id)?;
        Ok(Some(blob.content().to_vec()))
    }
}
