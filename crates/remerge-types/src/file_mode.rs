/// Git object mode as it appears in trees and index entries.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Mode used by index-info lines that remove a path.
    pub const REMOVE: FileMode = FileMode(0);
    pub const TREE: FileMode = FileMode(0o040000);
    pub const REGULAR: FileMode = FileMode(0o100644);
    pub const EXECUTABLE: FileMode = FileMode(0o100755);
    pub const SYMLINK: FileMode = FileMode(0o120000);
    pub const GITLINK: FileMode = FileMode(0o160000);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether an entry with this mode carries file content that can be merged.
    pub fn is_blob(self) -> bool {
        matches!(self, Self::REGULAR | Self::EXECUTABLE | Self::SYMLINK)
    }
}

impl std::fmt::Debug for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            write!(f, "0")
        } else {
            write!(f, "{:06o}", self.0)
        }
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<i32> for FileMode {
    fn from(bits: i32) -> Self {
        Self(bits as u32)
    }
}

impl From<FileMode> for u32 {
    fn from(mode: FileMode) -> Self {
        mode.0
    }
}

impl From<git2::FileMode> for FileMode {
    fn from(mode: git2::FileMode) -> Self {
        Self::from(i32::from(mode))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FileMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_octal() {
        assert_eq!(FileMode::REGULAR.to_string(), "100644");
        assert_eq!(FileMode::TREE.to_string(), "040000");
        assert_eq!(FileMode::REMOVE.to_string(), "0");
    }

    #[test]
    fn only_content_modes_are_blobs() {
        assert!(FileMode::REGULAR.is_blob());
        assert!(FileMode::EXECUTABLE.is_blob());
        assert!(FileMode::SYMLINK.is_blob());
        assert!(!FileMode::TREE.is_blob());
        assert!(!FileMode::GITLINK.is_blob());
        assert!(!FileMode::REMOVE.is_blob());
    }

    #[test]
    fn converts_from_git2_mode() {
        assert_eq!(FileMode::from(git2::FileMode::BlobExecutable), FileMode::EXECUTABLE);
        assert_eq!(FileMode::from(git2::FileMode::Link), FileMode::SYMLINK);
    }
}
