mod checkout;
mod config;
mod conflicts;
mod index_info;
mod remerge;
mod resolve;

pub use checkout::materialize_conflict;
pub use config::{ConflictStyle, Labels, Settings};
pub use conflicts::{ConflictEntry, ConflictKind, StageEntry, list_conflicts};
pub use index_info::{IndexInfo, IndexInfoLine};
pub use remerge::{Outcome, Plan, Remerge, RunOptions};
pub use remerge_types::{FileMode, IndexStage, InvalidRevSpecError, RevSpec};
pub use resolve::{ResolvedEntry, ThreeWay, resolve, resolve_all};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("Invalid revision spec: {0}")]
    InvalidSpec(#[from] InvalidRevSpecError),
    #[error("could not resolve '{spec}' to a file mode and object id")]
    Unresolved { spec: RevSpec },
    #[error("'{spec}' resolves to mode {mode}, which is not a file")]
    NotABlob { spec: RevSpec, mode: FileMode },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("repository has no working tree")]
    BareRepository,
    #[error("repository is not in the middle of a merge")]
    NotMerging,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
