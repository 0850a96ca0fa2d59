//! Where runtimes keep their modules and tools on each platform

use crate::platform::Os;
use std::path::{Path, PathBuf};

/// Directory layout of an extracted runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformLayout {
    /// `Contents/Home/...` application bundle
    MacBundle,
    /// Flat layout with `.exe` tools
    Windows,
    /// Flat layout
    Unix,
}

impl PlatformLayout {
    pub fn for_os(os: Os) -> Self {
        match os {
            Os::Mac => PlatformLayout::MacBundle,
            Os::Windows => PlatformLayout::Windows,
            Os::Linux | Os::Solaris | Os::Aix => PlatformLayout::Unix,
        }
    }

    fn home(&self, root: &Path) -> PathBuf {
        match self {
            PlatformLayout::MacBundle => root.join("Contents").join("Home"),
            PlatformLayout::Windows | PlatformLayout::Unix => root.to_path_buf(),
        }
    }

    /// Directory holding the runtime's `.jmod` files
    pub fn module_dir(&self, root: &Path) -> PathBuf {
        self.home(root).join("jmods")
    }

    /// The jlink executable
    pub fn jlink_executable(&self, root: &Path) -> PathBuf {
        let name = match self {
            PlatformLayout::Windows => "jlink.exe",
            PlatformLayout::MacBundle | PlatformLayout::Unix => "jlink",
        };
        self.home(root).join("bin").join(name)
    }
}
