//! Scoped scratch directories for tools that only work on named files.

use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tempfile::{Builder, TempDir};
use tracing::warn;

const WORKSPACE_PREFIX: &str = "cellviz-";

/// A freshly created directory that is removed, with everything in it, when the
/// workspace is dropped or closed.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Create a workspace under `root`, or under the system temp directory.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Read a file produced inside the workspace; `Ok(None)` if it does not exist.
    pub fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.dir.path().join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Remove the directory now; a removal error is only logged.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!(
                target = "infra::workspace",
                path = %path.display(),
                error = %err,
                "Failed to remove temporary workspace"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_is_removed_on_drop() {
        let root = TempDir::new().expect("root");
        let path = {
            let workspace = TempWorkspace::create(Some(root.path())).expect("workspace");
            workspace.write("code.tex", b"\\relax").expect("write");
            workspace.path().to_path_buf()
        };
        assert!(!path.exists(), "workspace survived drop: {}", path.display());
    }

    #[test]
    fn workspace_is_removed_on_close() {
        let root = TempDir::new().expect("root");
        let workspace = TempWorkspace::create(Some(root.path())).expect("workspace");
        let path = workspace.path().to_path_buf();
        workspace.close();
        assert!(!path.exists());
    }

    #[test]
    fn reading_missing_file_yields_none() {
        let workspace = TempWorkspace::create(None).expect("workspace");
        assert!(workspace.read("code.pdf").expect("read").is_none());
        workspace.write("code.pdf", b"%PDF").expect("write");
        assert_eq!(
            workspace.read("code.pdf").expect("read").as_deref(),
            Some(&b"%PDF"[..])
        );
    }

    #[test]
    fn missing_root_is_created() {
        let root = TempDir::new().expect("root");
        let nested = root.path().join("a").join("b");
        let workspace = TempWorkspace::create(Some(&nested)).expect("workspace");
        assert!(workspace.path().starts_with(&nested));
    }
}
