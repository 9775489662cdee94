/// Slot of an index entry. Stage 0 holds merged content, stages 1-3 hold
/// the unmerged ancestor/ours/theirs versions of a conflicted path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexStage {
    Normal,
    Ancestor,
    Ours,
    Theirs,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid index stage: {0} (expected 0-3)")]
pub struct InvalidStageError(pub i64);

impl IndexStage {
    pub const UNMERGED: [IndexStage; 3] = [Self::Ancestor, Self::Ours, Self::Theirs];

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::Ancestor => 1,
            Self::Ours => 2,
            Self::Theirs => 3,
        }
    }
}

impl std::fmt::Display for IndexStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl TryFrom<i32> for IndexStage {
    type Error = InvalidStageError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Ancestor),
            2 => Ok(Self::Ours),
            3 => Ok(Self::Theirs),
            other => Err(InvalidStageError(other.into())),
        }
    }
}

impl TryFrom<u8> for IndexStage {
    type Error = InvalidStageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i32::from(value))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for IndexStage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}
