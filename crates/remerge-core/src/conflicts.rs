use git2::{Index, IndexEntry};
use remerge_types::FileMode;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    BothModified,
    BothAdded,
    DeletedByUs,
    DeletedByThem,
    AddedByUs,
    AddedByThem,
}

impl ConflictKind {
    fn classify(ancestor: bool, ours: bool, theirs: bool) -> Self {
        match (ancestor, ours, theirs) {
            (true, true, true) => Self::BothModified,
            (false, true, true) => Self::BothAdded,
            (true, false, true) => Self::DeletedByUs,
            (true, true, false) => Self::DeletedByThem,
            (false, true, false) => Self::AddedByUs,
            (false, false, true) => Self::AddedByThem,
            // libgit2 never reports a conflict with no sides.
            (_, false, false) => Self::BothModified,
        }
    }

    /// Whether this is one half of a rename the merge did not pair up.
    pub fn is_rename_candidate(self) -> bool {
        matches!(
            self,
            Self::DeletedByUs | Self::DeletedByThem | Self::AddedByUs | Self::AddedByThem
        )
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::BothModified => write!(f, "both modified"),
            ConflictKind::BothAdded => write!(f, "both added"),
            ConflictKind::DeletedByUs => write!(f, "deleted by us"),
            ConflictKind::DeletedByThem => write!(f, "deleted by them"),
            ConflictKind::AddedByUs => write!(f, "added by us"),
            ConflictKind::AddedByThem => write!(f, "added by them"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageEntry {
    pub mode: FileMode,
    pub oid: String,
}

impl From<&IndexEntry> for StageEntry {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            mode: FileMode::from(entry.mode),
            oid: entry.id.to_string(),
        }
    }
}

/// An unmerged path and whatever it has at stages 1-3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    pub path: String,
    pub kind: ConflictKind,
    pub ancestor: Option<StageEntry>,
    pub ours: Option<StageEntry>,
    pub theirs: Option<StageEntry>,
}

pub fn list_conflicts(index: &Index) -> Result<Vec<ConflictEntry>> {
    let mut entries = Vec::new();

    for conflict in index.conflicts()? {
        let conflict = conflict?;

        let path = conflict
            .ancestor
            .as_ref()
            .or(conflict.our.as_ref())
            .or(conflict.their.as_ref())
            .map(|e| String::from_utf8_lossy(&e.path).into_owned())
            .unwrap_or_default();

        let kind = ConflictKind::classify(
            conflict.ancestor.is_some(),
            conflict.our.is_some(),
            conflict.their.is_some(),
        );

        entries.push(ConflictEntry {
            path,
            kind,
            ancestor: conflict.ancestor.as_ref().map(StageEntry::from),
            ours: conflict.our.as_ref().map(StageEntry::from),
            theirs: conflict.their.as_ref().map(StageEntry::from),
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use test_repo::{TestRepo, rename_conflict};

    use super::*;

    type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    #[test]
    fn classify_covers_every_side_combination() {
        assert_eq!(ConflictKind::classify(true, true, true), ConflictKind::BothModified);
        assert_eq!(ConflictKind::classify(false, true, true), ConflictKind::BothAdded);
        assert_eq!(ConflictKind::classify(true, false, true), ConflictKind::DeletedByUs);
        assert_eq!(ConflictKind::classify(true, true, false), ConflictKind::DeletedByThem);
        assert_eq!(ConflictKind::classify(false, true, false), ConflictKind::AddedByUs);
        assert_eq!(ConflictKind::classify(false, false, true), ConflictKind::AddedByThem);
    }

    #[test]
    fn lists_deleted_by_us_after_undetected_rename() -> Result {
        let repo = rename_conflict()?;
        let index = repo.repo.index()?;

        let conflicts = list_conflicts(&index)?;
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.path, "old.txt");
        assert_eq!(conflict.kind, ConflictKind::DeletedByUs);
        assert!(conflict.kind.is_rename_candidate());
        assert!(conflict.ancestor.is_some());
        assert!(conflict.ours.is_none());
        assert_eq!(conflict.theirs.as_ref().map(|s| s.mode), Some(FileMode::REGULAR));
        Ok(())
    }

    #[test]
    fn clean_index_has_no_conflicts() -> Result {
        let repo = TestRepo::new()?;
        repo.write_file("a.txt", "a")?;
        repo.commit("initial")?;
        assert!(list_conflicts(&repo.repo.index()?)?.is_empty());
        Ok(())
    }

    #[test]
    fn display_matches_git_status_wording() {
        assert_eq!(ConflictKind::DeletedByThem.to_string(), "deleted by them");
        assert_eq!(ConflictKind::BothModified.to_string(), "both modified");
    }
}
