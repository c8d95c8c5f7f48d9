use std::{
    fs, io,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use crate::errors::{FileOperation, IoError};

/// Enum of possible operations to rollback
pub enum RollbackOperation {
    RemoveFile(PathBuf),
    RemoveDir(PathBuf),
}
/// Scaffold still being written
pub struct Active;
/// Scaffold fully written
pub struct Committed;
/// A trait that tells us if rollback should occur when dropped.
pub trait TransactionState {
    const SHOULD_ROLLBACK: bool;
}
impl TransactionState for Active {
    const SHOULD_ROLLBACK: bool = true;
}
impl TransactionState for Committed {
    const SHOULD_ROLLBACK: bool = false;
}
/// Records every path a scaffold run creates under its root.
///
/// A `Transaction<Active>` that is dropped without [`Transaction::commit`] (for instance
/// because `?` bailed out of a write) undoes what it recorded in reverse order, root last,
/// so a failed run leaves nothing behind. A `Transaction<Committed>` only keeps the tallies.
///
/// ```rust,ignore
/// let mut trx = Transaction::<Active>::begin(root.clone());
/// fs::write(root.join("server.js"), source)?;
/// trx.record_file(root.join("server.js"));
/// let done = trx.commit(); // nothing is removed
/// ```
pub struct Transaction<State: TransactionState> {
    root: PathBuf,
    rollback_operations: Vec<RollbackOperation>,
    files: usize,
    directories: usize,
    state: PhantomData<State>,
}
impl Transaction<Active> {
    /// Starts a transaction for a root directory that the caller has just created.
    pub fn begin(root: PathBuf) -> Self {
        Transaction {
            rollback_operations: vec![RollbackOperation::RemoveDir(root.clone())],
            root,
            files: 0,
            directories: 1,
            state: PhantomData,
        }
    }

    pub fn record_dir(&mut self, path: PathBuf) {
        self.directories += 1;
        self.rollback_operations
            .push(RollbackOperation::RemoveDir(path));
    }

    pub fn record_file(&mut self, path: PathBuf) {
        self.files += 1;
        self.rollback_operations
            .push(RollbackOperation::RemoveFile(path));
    }

    /// Finalizes the transaction, preventing any rollback from occurring.
    pub fn commit(mut self) -> Transaction<Committed> {
        self.rollback_operations.clear();

        Transaction {
            root: std::mem::take(&mut self.root),
            rollback_operations: vec![],
            files: self.files,
            directories: self.directories,
            state: PhantomData,
        }
    }
}
impl<S: TransactionState> Transaction<S> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> usize {
        self.files
    }

    /// Directories recorded, the root included.
    pub fn directories(&self) -> usize {
        self.directories
    }
}
impl<S: TransactionState> Drop for Transaction<S> {
    fn drop(&mut self) {
        if S::SHOULD_ROLLBACK && !self.rollback_operations.is_empty() {
            log::warn!("rolling back partially written {}", self.root.display());
            while let Some(operation) = self.rollback_operations.pop() {
                let (path, result) = match operation {
                    RollbackOperation::RemoveDir(path) => {
                        log::debug!("removing dir: {}", path.display());
                        let result = fs::remove_dir_all(&path);
                        (path, result)
                    }
                    RollbackOperation::RemoveFile(path) => {
                        log::debug!("removing file: {}", path.display());
                        let result = fs::remove_file(&path);
                        (path, result)
                    }
                };

                // an inner path may already be gone with its parent
                match result {
                    Err(error) if error.kind() != io::ErrorKind::NotFound => {
                        log::warn!("{}", IoError::new(FileOperation::Remove, path, error));
                    }
                    _ => {}
                }
            }
        } else if !S::SHOULD_ROLLBACK {
            log::debug!("committed {}", self.root.display());
        }
    }
}
