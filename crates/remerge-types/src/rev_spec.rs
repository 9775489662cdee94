use std::str::FromStr;

use crate::IndexStage;

/// Reference to one version of a file, in the syntax accepted on the command line.
///
/// * `""` or `/dev/null`: the empty blob
/// * `:N:path`: the index entry for `path` at stage `N`; `:path` means stage 0
/// * `treeish:path`: `path` inside any revision or tree
/// * `path`: `path` on the current branch (`HEAD:path`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevSpec {
    EmptyBlob,
    IndexStage { stage: IndexStage, path: String },
    TreePath { treeish: String, path: String },
    HeadPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRevSpecError {
    #[error("empty path in revision spec '{0}'")]
    EmptyPath(String),
    #[error("invalid stage '{stage}' in revision spec '{spec}' (expected 0-3)")]
    InvalidStage { spec: String, stage: char },
    #[error("absolute path in revision spec '{0}'; paths are relative to the repository root")]
    AbsolutePath(String),
}

impl RevSpec {
    pub fn parse(input: &str) -> Result<Self, InvalidRevSpecError> {
        if input.is_empty() || input == "/dev/null" {
            return Ok(Self::EmptyBlob);
        }

        if let Some(rest) = input.strip_prefix(':') {
            let bytes = rest.as_bytes();
            if bytes.len() >= 2 && bytes[0].is_ascii_digit() && bytes[1] == b':' {
                let digit = bytes[0] - b'0';
                let stage =
                    IndexStage::try_from(digit).map_err(|_| InvalidRevSpecError::InvalidStage {
                        spec: input.to_string(),
                        stage: bytes[0] as char,
                    })?;
                let path = normalize_path(input, &rest[2..])?;
                return Ok(Self::IndexStage { stage, path });
            }
            let path = normalize_path(input, rest)?;
            return Ok(Self::IndexStage {
                stage: IndexStage::Normal,
                path,
            });
        }

        if let Some((treeish, path)) = input.split_once(':') {
            let path = normalize_path(input, path)?;
            return Ok(Self::TreePath {
                treeish: treeish.to_string(),
                path,
            });
        }

        Ok(Self::HeadPath(normalize_path(input, input)?))
    }
}

fn normalize_path(spec: &str, path: &str) -> Result<String, InvalidRevSpecError> {
    let mut path = path;
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped;
    }
    if path.is_empty() {
        return Err(InvalidRevSpecError::EmptyPath(spec.to_string()));
    }
    if path.starts_with('/') {
        return Err(InvalidRevSpecError::AbsolutePath(spec.to_string()));
    }
    Ok(path.to_string())
}

impl std::fmt::Display for RevSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBlob => write!(f, "/dev/null"),
            Self::IndexStage { stage, path } => write!(f, ":{}:{}", stage, path),
            Self::TreePath { treeish, path } => write!(f, "{}:{}", treeish, path),
            Self::HeadPath(path) => write!(f, "{}", path),
        }
    }
}

impl FromStr for RevSpec {
    type Err = InvalidRevSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RevSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
