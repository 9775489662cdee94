use git2::{Index, Repository, build::CheckoutBuilder};

use crate::{ConflictStyle, Error, Result, Settings};

/// Writes `path` from `index` into the working tree. When the index holds
/// stages 1-3 for it, libgit2 merges them and leaves conflict markers where
/// the sides disagree.
pub fn materialize_conflict(
    repo: &Repository,
    index: &mut Index,
    path: &str,
    settings: &Settings,
) -> Result<()> {
    if repo.workdir().is_none() {
        return Err(Error::BareRepository);
    }

    let mut checkout = CheckoutBuilder::new();
    checkout
        .force()
        .allow_conflicts(true)
        .disable_pathspec_match(true)
        .path(path)
        .ancestor_label(&settings.labels.ancestor)
        .our_label(&settings.labels.ours)
        .their_label(&settings.labels.theirs);
    match settings.conflict_style {
        ConflictStyle::Merge => checkout.conflict_style_merge(true),
        ConflictStyle::Diff3 => checkout.conflict_style_diff3(true),
    };

    repo.checkout_index(Some(index), Some(&mut checkout))?;
    log::info!("checked out {} with {:?} conflict style", path, settings.conflict_style);
    Ok(())
}
