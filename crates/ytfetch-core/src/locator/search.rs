//! Filesystem search for an executable: override, `PATH`, well-known dirs.

use std::path::{Path, PathBuf};

/// Ordered candidate list for one executable name.
#[derive(Debug, Clone)]
pub struct BinarySearch {
    name: String,
    override_path: Option<PathBuf>,
    path_dirs: Vec<PathBuf>,
    well_known: Vec<PathBuf>,
}

impl BinarySearch {
    /// Empty search for `name` (no directories). Add dirs with the builder methods.
    pub fn new(name: &str) -> Self {
        Self {
            name: executable_name(name),
            override_path: None,
            path_dirs: Vec::new(),
            well_known: Vec::new(),
        }
    }

    /// Search the process `PATH` followed by the platform's well-known directories.
    pub fn from_env(name: &str) -> Self {
        let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        Self::new(name)
            .with_path_dirs(path_dirs)
            .with_well_known(well_known_dirs())
    }

    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path;
        self
    }

    pub fn with_path_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.path_dirs = dirs;
        self
    }

    pub fn with_well_known(mut self, dirs: Vec<PathBuf>) -> Self {
        self.well_known = dirs;
        self
    }

    /// All candidate paths in search order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(1 + self.path_dirs.len() + self.well_known.len());
        if let Some(p) = &self.override_path {
            out.push(p.clone());
        }
        out.extend(self.path_dirs.iter().map(|d| d.join(&self.name)));
        out.extend(self.well_known.iter().map(|d| d.join(&self.name)));
        out
    }

    /// First candidate that exists and is executable.
    pub fn find(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|p| is_executable(p))
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) && !name.ends_with(".exe") {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Well-known install directories for the current platform family.
pub fn well_known_dirs() -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(target_os = "macos") {
        &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]
    } else if cfg!(windows) {
        &["C:\\ffmpeg\\bin", "C:\\Program Files\\ffmpeg\\bin"]
    } else {
        &["/usr/local/bin", "/usr/bin", "/snap/bin"]
    };
    dirs.iter().map(PathBuf::from).collect()
}

/// Regular file with at least one execute bit (any regular file on non-Unix).
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
