//! Path spaces
//!
//! The step process runs at the checkout root while Testplane runs inside the
//! `cwd` input directory. Paths published as outputs are root-relative; paths
//! handed to Testplane are invocation-relative.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkingDir {
    root: PathBuf,
    cwd: PathBuf,
}

impl WorkingDir {
    /// Working directory relative to the current process directory
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self::with_root(".", cwd)
    }

    pub fn with_root(root: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Testplane-relative path as seen from the checkout root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.cwd.join(path))
    }

    /// Checkout-relative path as seen from the Testplane directory
    pub fn invocation_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        let root = absolute(&self.root);
        let cwd = normalize(&root.join(&self.cwd));
        let back_to_root = pathdiff::diff_paths(&root, &cwd).unwrap_or_else(|| root.clone());

        normalize(&back_to_root.join(path))
    }

    /// Filesystem location of a root-relative path
    pub fn resolve(&self, root_relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(root_relative)
    }
}

/// Lexically collapse `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

fn absolute(path: &Path) -> PathBuf {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    normalize(&path)
}
