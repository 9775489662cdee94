use std::path::Path;

use git2::{
    AnnotatedCommit, BranchType, IndexAddOption, MergeOptions, Oid, Repository,
    RepositoryInitOptions, Signature, build::CheckoutBuilder,
};
use tempfile::TempDir;

pub struct TestRepo {
    pub repo: Repository,
    _dir: TempDir,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, Error>;

impl TestRepo {
    /// Creates an empty repository whose HEAD points at the unborn `main` branch.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts)?;
        {
            let mut config = repo.config()?;
            config.set_str("user.name", "Test User")?;
            config.set_str("user.email", "test@test.com")?;
        }
        Ok(Self { _dir: dir, repo })
    }

    pub fn path(&self) -> &Path {
        self._dir.path()
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self._dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(())
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self._dir.path().join(path))?)
    }

    pub fn delete_file(&self, path: &str) -> Result<()> {
        std::fs::remove_file(self._dir.path().join(path))?;
        Ok(())
    }

    pub fn rename_file(&self, old_path: &str, new_path: &str) -> Result<()> {
        let old_file_path = self._dir.path().join(old_path);
        let new_file_path = self._dir.path().join(new_path);
        if let Some(parent) = new_file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&old_file_path, &new_file_path)?;
        Ok(())
    }

    /// Stages every change in the working tree, deletions included, and commits it on HEAD.
    pub fn commit(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let sig = Signature::now("Test", "test@test.com")?;
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(oid)
    }

    /// Creates `name` at the current HEAD commit without switching to it.
    pub fn branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;
        Ok(())
    }

    pub fn checkout(&self, name: &str) -> Result<()> {
        let branch = self.repo.find_branch(name, BranchType::Local)?;
        let ref_name = branch
            .get()
            .name()
            .ok_or_else(|| git2::Error::from_str("branch name is not utf-8"))?
            .to_string();
        self.repo.set_head(&ref_name)?;
        self.repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
        Ok(())
    }

    /// Merges `branch` into HEAD with rename detection turned off, leaving any
    /// conflicts in the index and working tree the way `git merge` would.
    pub fn merge_without_renames(&self, branch: &str) -> Result<()> {
        let annotated = self.annotated(branch)?;
        let mut merge_opts = MergeOptions::new();
        merge_opts.find_renames(false);
        let mut checkout = CheckoutBuilder::new();
        checkout.allow_conflicts(true).conflict_style_merge(true);
        self.repo
            .merge(&[&annotated], Some(&mut merge_opts), Some(&mut checkout))?;
        Ok(())
    }

    fn annotated(&self, branch: &str) -> Result<AnnotatedCommit<'_>> {
        let branch = self.repo.find_branch(branch, BranchType::Local)?;
        Ok(self.repo.reference_to_annotated_commit(branch.get())?)
    }
}

/// Ancestor content shared by [`rename_conflict`] fixtures.
pub const BASE_CONTENT: &str = "one\ntwo\nthree\nfour\nfive\n";

/// Builds the situation this crate exists to test:
///
/// * `main` renames `old.txt` to `new.txt` and edits line `two`
/// * `feature` edits line `two` of `old.txt` differently
/// * `feature` is merged into `main` with rename detection off
///
/// The result is a "deleted by us" conflict on `old.txt` and a clean
/// `new.txt`, instead of a content conflict on `new.txt`.
pub fn rename_conflict() -> Result<TestRepo> {
    let repo = TestRepo::new()?;
    repo.write_file("old.txt", BASE_CONTENT)?;
    repo.write_file("other.txt", "untouched\n")?;
    repo.commit("base")?;
    repo.branch("feature")?;

    repo.rename_file("old.txt", "new.txt")?;
    repo.write_file("new.txt", "one\nTWO ours\nthree\nfour\nfive\n")?;
    repo.commit("rename and edit")?;

    repo.checkout("feature")?;
    repo.write_file("old.txt", "one\nTWO theirs\nthree\nfour\nfive\n")?;
    repo.commit("edit old")?;

    repo.checkout("main")?;
    repo.merge_without_renames("feature")?;
    Ok(repo)
}
