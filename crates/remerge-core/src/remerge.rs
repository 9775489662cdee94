use git2::{Repository, RepositoryState};
use remerge_types::RevSpec;

use crate::{
    Error, IndexInfo, IndexInfoLine, Result, Settings, ThreeWay, materialize_conflict, resolve_all,
};

/// Rebuilds the three-way conflict for a renamed file that the merge
/// reported as an unrelated delete and add.
pub struct Remerge<'a> {
    repo: &'a Repository,
    settings: Settings,
}

/// Everything resolved and ready to write. Building one touches nothing but
/// the object database.
#[derive(Debug, Clone)]
pub struct Plan {
    pub path: String,
    pub three_way: ThreeWay,
    pub dropped: Vec<String>,
    pub index_info: IndexInfo,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub no_checkout: bool,
    pub require_merge: bool,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub path: String,
    pub lines: Vec<IndexInfoLine>,
    pub checked_out: bool,
}

impl<'a> Remerge<'a> {
    pub fn new(repo: &'a Repository, settings: Settings) -> Self {
        Self { repo, settings }
    }

    pub fn plan(
        &self,
        path: &str,
        base: &RevSpec,
        ours: &RevSpec,
        theirs: &RevSpec,
        drop: &[String],
    ) -> Result<Plan> {
        let path = normalize_path(path)?;
        let three_way = resolve_all(self.repo, base, ours, theirs)?;
        let mut index_info = IndexInfo::rename_merge(&path, &three_way);

        let mut dropped = Vec::with_capacity(drop.len());
        for source in drop {
            let source = normalize_path(source)?;
            if source == path {
                return Err(Error::InvalidPath(format!(
                    "'{}' is the rename destination and cannot be dropped",
                    source
                )));
            }
            index_info.extend(IndexInfo::drop_path(&source));
            dropped.push(source);
        }

        Ok(Plan {
            path,
            three_way,
            dropped,
            index_info,
        })
    }

    pub fn run(&self, plan: &Plan, options: &RunOptions) -> Result<Outcome> {
        self.check_merge_state(options.require_merge)?;

        let mut index = self.repo.index()?;
        index.read(false)?;
        plan.index_info.apply(&mut index)?;
        index.write()?;
        log::info!(
            "recorded {} as unmerged (base {}, ours {}, theirs {})",
            plan.path,
            plan.three_way.base.spec,
            plan.three_way.ours.spec,
            plan.three_way.theirs.spec
        );
        for source in &plan.dropped {
            log::info!("cleared conflict at {}", source);
        }

        let checked_out = self.settings.checkout && !options.no_checkout;
        if checked_out {
            materialize_conflict(self.repo, &mut index, &plan.path, &self.settings)?;
        }

        Ok(Outcome {
            path: plan.path.clone(),
            lines: plan.index_info.lines().to_vec(),
            checked_out,
        })
    }

    fn check_merge_state(&self, require_merge: bool) -> Result<()> {
        match self.repo.state() {
            RepositoryState::Merge
            | RepositoryState::CherryPick
            | RepositoryState::CherryPickSequence
            | RepositoryState::Revert
            | RepositoryState::RevertSequence
            | RepositoryState::Rebase
            | RepositoryState::RebaseInteractive
            | RepositoryState::RebaseMerge
            | RepositoryState::ApplyMailbox
            | RepositoryState::ApplyMailboxOrRebase => Ok(()),
            state if require_merge => {
                log::debug!("repository state is {:?}", state);
                Err(Error::NotMerging)
            }
            state => {
                log::warn!(
                    "repository is not merging (state {:?}); recording the conflict anyway",
                    state
                );
                Ok(())
            }
        }
    }
}

fn normalize_path(path: &str) -> Result<String> {
    let mut trimmed = path.trim_end_matches('/');
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    if trimmed.is_empty() {
        return Err(Error::InvalidPath("empty path".to_string()));
    }
    // Index paths are stored verbatim; git rejects empty, `.` and `..` segments.
    if trimmed
        .split('/')
        .any(|segment| matches!(segment, "" | "." | ".."))
    {
        return Err(Error::InvalidPath(format!(
            "'{}' must be a plain path relative to the repository root",
            path
        )));
    }
    Ok(trimmed.to_string())
}
