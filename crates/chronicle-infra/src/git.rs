//! Git repository scanning over libgit2.
//!
//! Walks a repository's recent history, diffs each commit against its
//! first parent for the changed-file list, and persists anything not
//! already recorded for that (sha, repo_path) pair. Re-scans are
//! idempotent.

use chrono::{DateTime, Utc};
use git2::{Repository, Sort};
use thiserror::Error;

use chronicle_core::repository::CommitRepository;
use chronicle_types::commit::Commit;
use chronicle_types::error::{GitError, RepositoryError};

/// Errors from syncing a repository into the commit store.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read-only scanner over a local git repository.
pub struct GitScanner;

impl GitScanner {
    /// Collect up to `limit` recent commits from `repo_path`, newest first.
    pub fn scan(repo_path: &str, limit: usize) -> Result<Vec<Commit>, GitError> {
        if !std::path::Path::new(repo_path).exists() {
            return Err(GitError::PathMissing(repo_path.to_string()));
        }

        let repo = Repository::open(repo_path)
            .map_err(|_| GitError::NotARepository(repo_path.to_string()))?;

        let canonical = std::fs::canonicalize(repo_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| repo_path.to_string());

        let branch = repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(str::to_string));

        let mut revwalk = repo.revwalk().map_err(|e| GitError::Git(e.to_string()))?;
        revwalk
            .set_sorting(Sort::TIME)
            .map_err(|e| GitError::Git(e.to_string()))?;
        revwalk.push_head().map_err(|e| GitError::Git(e.to_string()))?;

        let mut commits = Vec::new();
        for oid in revwalk.take(limit) {
            let oid = oid.map_err(|e| GitError::Git(e.to_string()))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| GitError::Git(e.to_string()))?;

            let timestamp = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
                .unwrap_or_else(Utc::now);

            let author = commit.author();
            let author_display = match (author.name(), author.email()) {
                (Some(name), Some(email)) => format!("{name} <{email}>"),
                (Some(name), None) => name.to_string(),
                _ => "unknown".to_string(),
            };

            commits.push(Commit {
                id: 0,
                timestamp,
                sha: oid.to_string(),
                message: commit.message().unwrap_or("").trim().to_string(),
                author: author_display,
                branch: branch.clone(),
                repo_path: canonical.clone(),
                files_changed: Self::changed_files(&repo, &commit),
            });
        }

        Ok(commits)
    }

    /// Paths touched by a commit, diffed against its first parent. The
    /// initial commit diffs against an empty tree.
    fn changed_files(repo: &Repository, commit: &git2::Commit<'_>) -> Vec<String> {
        let tree = match commit.tree() {
            Ok(tree) => tree,
            Err(_) => return Vec::new(),
        };
        let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

        let diff = match repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None) {
            Ok(diff) => diff,
            Err(_) => return Vec::new(),
        };

        diff.deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.display().to_string())
            })
            .collect()
    }
}

/// Scan a repository and persist every commit not yet recorded.
/// Returns the newly added commits, newest first.
pub async fn sync_repository<R: CommitRepository>(
    commits: &R,
    repo_path: &str,
    limit: usize,
) -> Result<Vec<Commit>, SyncError> {
    let scanned = GitScanner::scan(repo_path, limit)?;
    let mut added = Vec::new();

    for mut commit in scanned {
        if commits.exists(&commit.sha, &commit.repo_path).await? {
            continue;
        }
        commit.id = commits.insert(&commit).await?;
        added.push(commit);
    }

    tracing::info!(repo_path, added = added.len(), "repository synced");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_rejects_missing_path() {
        let err = GitScanner::scan("/does/not/exist", 10).unwrap_err();
        assert!(matches!(err, GitError::PathMissing(_)));
    }

    #[test]
    fn test_scan_rejects_non_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitScanner::scan(dir.path().to_str().unwrap(), 10).unwrap_err();
        assert!(matches!(err, GitError::NotARepository(_)));
    }

    #[test]
    fn test_scan_reads_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        // One commit with a single file.
        let file = dir.path().join("README.md");
        std::fs::write(&file, "# test\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Dev", "dev@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        let commits = GitScanner::scan(dir.path().to_str().unwrap(), 10).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "Initial commit");
        assert_eq!(commits[0].author, "Dev <dev@example.com>");
        assert_eq!(commits[0].files_changed, vec!["README.md"]);
    }
}
