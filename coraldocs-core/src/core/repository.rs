//! Git-backed content repository: one repository per workspace.
//!
//! All durable state lives here. Each logical mutation becomes exactly one
//! commit; the working directory holds the current content, and history is
//! replayed per file path. Repositories are standard git on disk, so
//! external tooling can inspect them.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature, Sort};

use crate::core::error::{CoreError, Result};
use crate::core::node::{CommitMeta, HistoryPage};

/// Directory holding uncommitted sidecar state (the tree index); excluded
/// from version control via the repository's `.gitignore`.
pub const SIDECAR_DIR: &str = ".coraldocs";

/// History page size cap; requests beyond it are clamped.
const MAX_HISTORY: usize = 1000;

/// A versioned file store rooted at one workspace directory.
///
/// All mutating methods take `&mut self`; the owning store serializes
/// writers, so every commit applies cleanly against the current head and
/// conflicts cannot arise (last-writer-wins by construction).
pub struct ContentRepository {
    dir: PathBuf,
    repo: Repository,
    author_name: String,
    author_email: String,
}

impl std::fmt::Debug for ContentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRepository")
            .field("dir", &self.dir)
            .field("author_name", &self.author_name)
            .field("author_email", &self.author_email)
            .finish_non_exhaustive()
    }
}

impl ContentRepository {
    /// Opens the repository at `dir`, initializing it on first use.
    ///
    /// Initialization writes a `.gitignore` excluding the sidecar
    /// directory and creates the initial commit, so the repository always
    /// has a head. Only a missing repository triggers initialization; a
    /// repository that exists but cannot be opened (corrupt metadata) is
    /// an error — its history must never be silently replaced.
    pub fn open_or_init(dir: &Path, author_name: &str, author_email: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let (repo, fresh) = match Repository::open(dir) {
            Ok(repo) => (repo, false),
            Err(e) if e.code() == git2::ErrorCode::NotFound => (Repository::init(dir)?, true),
            Err(e) => return Err(e.into()),
        };
        let mut this = ContentRepository {
            dir: dir.to_path_buf(),
            repo,
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        };
        if fresh {
            let gitignore = format!("{SIDECAR_DIR}/\n");
            this.commit_files(
                &[(".gitignore".to_string(), gitignore)],
                &[],
                "init: workspace repository",
            )?;
        }
        Ok(this)
    }

    /// Writes and/or removes files and commits the result atomically.
    ///
    /// Each file is written to a temp sibling then renamed, so concurrent
    /// readers observe either the prior content or the full new content,
    /// never a partial write. Returns the new commit hash.
    ///
    /// # Errors
    ///
    /// [`CoreError::Io`] for filesystem failures, [`CoreError::Git`] for
    /// staging/commit failures; the repository head is left unchanged on
    /// any failure.
    pub fn commit_files(
        &mut self,
        writes: &[(String, String)],
        removals: &[String],
        message: &str,
    ) -> Result<String> {
        for (rel, content) in writes {
            let abs = self.dir.join(rel);
            if let Some(parent) = abs.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp = abs.with_extension("tmp");
            fs::write(&tmp, content)?;
            fs::rename(&tmp, &abs)?;
        }
        for rel in removals {
            let abs = self.dir.join(rel);
            fs::remove_file(&abs)?;
            // Drop the node directory if the removal emptied it.
            if let Some(parent) = abs.parent() {
                let _ = fs::remove_dir(parent);
            }
        }

        let mut index = self.repo.index()?;
        for (rel, _) in writes {
            index.add_path(Path::new(rel))?;
        }
        for rel in removals {
            index.remove_path(Path::new(rel))?;
        }
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let sig = Signature::now(&self.author_name, &self.author_email)?;
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(oid.to_string())
    }

    /// Reads the current content of `rel`.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] when the file does not exist.
    pub fn read(&self, rel: &str) -> Result<String> {
        read_current(&self.dir, rel)
    }

    /// True if `rel` currently exists in the working directory.
    #[must_use]
    pub fn exists(&self, rel: &str) -> bool {
        self.dir.join(rel).is_file()
    }

    /// Reads the content of `rel` as of a specific commit.
    pub fn read_at(&self, hash: &str, rel: &str) -> Result<String> {
        let oid = Oid::from_str(hash)
            .map_err(|_| CoreError::Validation(format!("invalid commit hash: {hash:?}")))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|_| CoreError::NotFound(format!("commit {hash}")))?;
        let tree = commit.tree()?;
        let entry = tree
            .get_path(Path::new(rel))
            .map_err(|_| CoreError::NotFound(format!("{rel} at commit {hash}")))?;
        let blob = self.repo.find_blob(entry.id())?;
        String::from_utf8(blob.content().to_vec())
            .map_err(|_| CoreError::Git(format!("non-UTF8 content in {rel}")))
    }

    /// Reverse-chronological commits touching `rel`.
    ///
    /// `cursor` is the hash of the last commit from the previous page;
    /// the walk resumes strictly after it. `limit` of 0 (or anything
    /// above the cap) means the cap. `next_cursor` is set only when at
    /// least one more matching commit exists beyond the page.
    pub fn history(&self, rel: &str, cursor: Option<&str>, limit: usize) -> Result<HistoryPage> {
        let limit = if limit == 0 || limit > MAX_HISTORY {
            MAX_HISTORY
        } else {
            limit
        };

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        let mut skip_first = false;
        match cursor {
            Some(hash) => {
                let oid = Oid::from_str(hash)
                    .map_err(|_| CoreError::Validation(format!("invalid cursor: {hash:?}")))?;
                walk.push(oid)?;
                skip_first = true;
            }
            None => walk.push_head()?,
        }

        let path = Path::new(rel);
        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid?;
            if skip_first {
                skip_first = false;
                continue;
            }
            let commit = self.repo.find_commit(oid)?;
            if !self.touches(&commit, path)? {
                continue;
            }
            commits.push(CommitMeta {
                hash: oid.to_string(),
                timestamp: commit.time().seconds(),
                message: commit.summary().unwrap_or("").to_string(),
            });
            // Collect one past the limit: only an overflowing match
            // proves a next page exists.
            if commits.len() > limit {
                break;
            }
        }

        let next_cursor = if commits.len() > limit {
            commits.truncate(limit);
            commits.last().map(|c| c.hash.clone())
        } else {
            None
        };
        Ok(HistoryPage {
            commits,
            next_cursor,
        })
    }

    /// True when `commit` changed the blob at `path` relative to its
    /// first parent (or introduced it, for the initial commit).
    fn touches(&self, commit: &git2::Commit, path: &Path) -> Result<bool> {
        let entry = commit.tree()?.get_path(path).ok().map(|e| e.id());
        let parent_entry = match commit.parent(0) {
            Ok(parent) => parent.tree()?.get_path(path).ok().map(|e| e.id()),
            Err(_) => None,
        };
        Ok(entry != parent_entry)
    }
}

/// Lock-free read of the current content of `rel` under `dir`.
///
/// Split out so the workspace store can serve reads without touching the
/// repository handle (which writers hold during commits).
pub fn read_current(dir: &Path, rel: &str) -> Result<String> {
    match fs::read_to_string(dir.join(rel)) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CoreError::NotFound(rel.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
