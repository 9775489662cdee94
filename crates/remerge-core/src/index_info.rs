use std::path::Path;

use git2::{Index, IndexEntry, IndexTime, Oid};
use remerge_types::{FileMode, IndexStage};

use crate::{Result, ThreeWay};

const STAGE_SHIFT: u16 = 12;

/// One line of a `git update-index --index-info` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfoLine {
    pub mode: FileMode,
    pub oid: Oid,
    pub stage: IndexStage,
    pub path: String,
}

impl IndexInfoLine {
    /// Line that drops every stage of `path`.
    pub fn remove(path: &str) -> Self {
        Self {
            mode: FileMode::REMOVE,
            oid: Oid::zero(),
            stage: IndexStage::Normal,
            path: path.to_string(),
        }
    }

    pub fn is_remove(&self) -> bool {
        self.mode == FileMode::REMOVE
    }

    fn to_index_entry(&self) -> IndexEntry {
        IndexEntry {
            ctime: IndexTime::new(0, 0),
            mtime: IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: self.mode.bits(),
            uid: 0,
            gid: 0,
            file_size: 0,
            id: self.oid,
            flags: (self.stage.as_i32() as u16) << STAGE_SHIFT,
            flags_extended: 0,
            path: self.path.as_bytes().to_vec(),
        }
    }
}

impl std::fmt::Display for IndexInfoLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}\t{}", self.mode, self.oid, self.stage, self.path)
    }
}

/// Ordered index edits, applied top to bottom the way `update-index --index-info` does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInfo {
    lines: Vec<IndexInfoLine>,
}

impl IndexInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record the rename detector should have produced for `path`:
    /// clear the path, then stage base/ours/theirs at 1/2/3.
    pub fn rename_merge(path: &str, three_way: &ThreeWay) -> Self {
        let mut lines = vec![IndexInfoLine::remove(path)];
        for (stage, entry) in IndexStage::UNMERGED.into_iter().zip(three_way.entries()) {
            lines.push(IndexInfoLine {
                mode: entry.mode,
                oid: entry.oid,
                stage,
                path: path.to_string(),
            });
        }
        Self { lines }
    }

    pub fn drop_path(path: &str) -> Self {
        Self {
            lines: vec![IndexInfoLine::remove(path)],
        }
    }

    pub fn extend(&mut self, other: IndexInfo) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[IndexInfoLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Applies the record to the in-memory index. The caller writes it out.
    pub fn apply(&self, index: &mut Index) -> Result<()> {
        for line in &self.lines {
            if line.is_remove() {
                // Also moves any unmerged stages into the resolve-undo extension.
                index.remove_path(Path::new(&line.path))?;
            } else {
                index.add(&line.to_index_entry())?;
            }
            log::debug!("index-info: {}", line);
        }
        Ok(())
    }
}

impl std::fmt::Display for IndexInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_repo::rename_conflict;

    use super::*;
    use crate::{RevSpec, resolve_all};

    type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    fn three_way(repo: &git2::Repository) -> Result<ThreeWay> {
        Ok(resolve_all(
            repo,
            &RevSpec::parse(":1:old.txt")?,
            &RevSpec::parse("new.txt")?,
            &RevSpec::parse(":3:old.txt")?,
        )?)
    }

    #[test]
    fn rename_merge_renders_four_lines() -> Result {
        let repo = rename_conflict()?;
        let tw = three_way(&repo.repo)?;
        let info = IndexInfo::rename_merge("new.txt", &tw);

        let expected = format!(
            "0 {zero} 0\tnew.txt\n\
             100644 {base} 1\tnew.txt\n\
             100644 {ours} 2\tnew.txt\n\
             100644 {theirs} 3\tnew.txt\n",
            zero = Oid::zero(),
            base = tw.base.oid,
            ours = tw.ours.oid,
            theirs = tw.theirs.oid,
        );
        assert_eq!(info.to_string(), expected);
        assert_eq!(info.lines().len(), 4);
        Ok(())
    }

    #[test]
    fn apply_replaces_clean_entry_with_three_stages() -> Result {
        let repo = rename_conflict()?;
        let tw = three_way(&repo.repo)?;
        let mut index = repo.repo.index()?;
        assert!(index.get_path(Path::new("new.txt"), 0).is_some());

        IndexInfo::rename_merge("new.txt", &tw).apply(&mut index)?;

        assert!(index.get_path(Path::new("new.txt"), 0).is_none());
        let staged: Vec<Oid> = [1, 2, 3]
            .iter()
            .map(|stage| index.get_path(Path::new("new.txt"), *stage).map(|e| e.id))
            .collect::<Option<_>>()
            .ok_or("missing stage")?;
        assert_eq!(staged, vec![tw.base.oid, tw.ours.oid, tw.theirs.oid]);
        Ok(())
    }

    #[test]
    fn drop_path_clears_all_stages() -> Result {
        let repo = rename_conflict()?;
        let mut index = repo.repo.index()?;
        assert!(index.get_path(Path::new("old.txt"), 1).is_some());

        IndexInfo::drop_path("old.txt").apply(&mut index)?;

        for stage in 0..=3 {
            assert!(index.get_path(Path::new("old.txt"), stage).is_none());
        }
        assert!(!index.has_conflicts());
        Ok(())
    }

    #[test]
    fn dropping_absent_path_is_a_no_op() -> Result {
        let repo = rename_conflict()?;
        let mut index = repo.repo.index()?;
        let before = index.len();
        IndexInfo::drop_path("never-existed.txt").apply(&mut index)?;
        assert_eq!(index.len(), before);
        Ok(())
    }

    #[test]
    fn empty_record_is_a_no_op() -> Result {
        let repo = rename_conflict()?;
        let mut index = repo.repo.index()?;
        let before = index.len();

        let info = IndexInfo::new();
        assert!(info.is_empty());
        assert_eq!(info.to_string(), "");
        info.apply(&mut index)?;

        assert_eq!(index.len(), before);
        assert!(index.get_path(Path::new("new.txt"), 0).is_some());
        Ok(())
    }
}
