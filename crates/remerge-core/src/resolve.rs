use std::path::Path;

use git2::{ErrorCode, Oid, Repository};
use remerge_types::{FileMode, RevSpec};

use crate::{Error, Result};

/// A revision spec looked up in the object database: the mode and blob id
/// that go into one stage of the synthesized index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub spec: RevSpec,
    pub mode: FileMode,
    pub oid: Oid,
}

/// The three versions of a renamed file, in stage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeWay {
    pub base: ResolvedEntry,
    pub ours: ResolvedEntry,
    pub theirs: ResolvedEntry,
}

impl ThreeWay {
    pub fn entries(&self) -> [&ResolvedEntry; 3] {
        [&self.base, &self.ours, &self.theirs]
    }
}

pub fn resolve(repo: &Repository, spec: &RevSpec) -> Result<ResolvedEntry> {
    let found = match spec {
        // Written, not just hashed: checkout reads the blob back.
        RevSpec::EmptyBlob => Some((FileMode::REGULAR, repo.blob(&[])?)),
        RevSpec::IndexStage { stage, path } => {
            let mut index = repo.index()?;
            index.read(false)?;
            index
                .get_path(Path::new(path), stage.as_i32())
                .map(|entry| (FileMode::from(entry.mode), entry.id))
        }
        RevSpec::TreePath { treeish, path } => lookup_tree_path(repo, treeish, path)?,
        RevSpec::HeadPath(path) => lookup_tree_path(repo, "HEAD", path)?,
    };

    let (mode, oid) = found.ok_or_else(|| Error::Unresolved { spec: spec.clone() })?;
    if !mode.is_blob() {
        return Err(Error::NotABlob {
            spec: spec.clone(),
            mode,
        });
    }

    log::debug!("resolved {} to {} {}", spec, mode, oid);
    Ok(ResolvedEntry {
        spec: spec.clone(),
        mode,
        oid,
    })
}

pub fn resolve_all(
    repo: &Repository,
    base: &RevSpec,
    ours: &RevSpec,
    theirs: &RevSpec,
) -> Result<ThreeWay> {
    Ok(ThreeWay {
        base: resolve(repo, base)?,
        ours: resolve(repo, ours)?,
        theirs: resolve(repo, theirs)?,
    })
}

fn lookup_tree_path(repo: &Repository, treeish: &str, path: &str) -> Result<Option<(FileMode, Oid)>> {
    let object = match repo.revparse_single(treeish) {
        Ok(object) => object,
        Err(e)
            if matches!(
                e.code(),
                ErrorCode::NotFound
                    | ErrorCode::UnbornBranch
                    | ErrorCode::Ambiguous
                    | ErrorCode::InvalidSpec
            ) =>
        {
            log::debug!("'{}' does not name a revision: {}", treeish, e.message());
            return Ok(None);
        }
        Err(e) => return Err(Error::Git(e)),
    };

    let tree = match object.peel_to_tree() {
        Ok(tree) => tree,
        Err(e) => {
            log::debug!("'{}' does not peel to a tree: {}", treeish, e.message());
            return Ok(None);
        }
    };

    match tree.get_path(Path::new(path)) {
        Ok(entry) => Ok(Some((FileMode::from(entry.filemode()), entry.id()))),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(Error::Git(e)),
    }
}
