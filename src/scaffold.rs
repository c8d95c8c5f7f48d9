use crate::{
    errors::{FileOperation, IoError},
    manifest::WriteManifest,
    transactions::{Active, Transaction},
    utils::resolve_against,
};
use colored::Colorize;
use miette::Diagnostic;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScaffoldError {
    #[error("Folder already exists: {}", .path.display())]
    #[diagnostic(
        code(create_backend_app::scaffold::already_exists),
        help("Pick another project name or remove the existing path")
    )]
    AlreadyExists { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

/// Outcome of a successful [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub root: PathBuf,
    pub files_written: usize,
    /// Directories created, the root and any implied parents included.
    pub directories_created: usize,
}

/// Resolves the target root for `project_name` against `cwd`.
pub fn resolve_target(cwd: &Path, project_name: &str) -> PathBuf {
    resolve_against(cwd, Path::new(project_name))
}

/// Fails if anything, including a dangling symlink, already sits at `target`.
pub fn ensure_absent(target: &Path) -> Result<(), ScaffoldError> {
    match fs::symlink_metadata(target) {
        Ok(_) => Err(ScaffoldError::AlreadyExists {
            path: target.to_path_buf(),
        }),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(IoError::new(FileOperation::Metadata, target.to_path_buf(), error).into()),
    }
}

/// Claims `target` with a non-recursive create so a concurrent creator is reported as
/// [`ScaffoldError::AlreadyExists`] rather than silently shared.
fn create_root(target: &Path) -> Result<(), ScaffoldError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| IoError::new(FileOperation::Mkdir, parent.to_path_buf(), error))?;
    }

    match fs::create_dir(target) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            Err(ScaffoldError::AlreadyExists {
                path: target.to_path_buf(),
            })
        }
        Err(error) => Err(IoError::new(FileOperation::Mkdir, target.to_path_buf(), error).into()),
    }
}

/// Creates `path` and any missing parents, recording each directory that did not exist yet
/// (outermost first). An existing directory is not an error and is not recorded, so repeating
/// a directory list is harmless.
fn create_directory(trx: &mut Transaction<Active>, path: &Path) -> Result<(), ScaffoldError> {
    if path.is_dir() {
        return Ok(());
    }

    let missing: Vec<PathBuf> = path
        .ancestors()
        .take_while(|ancestor| !ancestor.exists())
        .map(Path::to_path_buf)
        .collect();

    fs::create_dir_all(path)
        .map_err(|error| IoError::new(FileOperation::Mkdir, path.into(), error))?;

    for dir in missing.into_iter().rev() {
        log::debug!("created directory {}", dir.display());
        trx.record_dir(dir);
    }

    Ok(())
}

/// Writes a new file; an existing file at `path` is an error, never overwritten.
fn write_file(
    trx: &mut Transaction<Active>,
    path: &Path,
    display: &Path,
    contents: &str,
) -> Result<(), ScaffoldError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|error| IoError::new(FileOperation::Write, path.into(), error))?;

    trx.record_file(path.to_path_buf());

    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|error| IoError::new(FileOperation::Write, path.into(), error))?;

    println!("{} {}", "create".green(), display.display());

    Ok(())
}

/// Materializes `manifest` under `target`, which must not exist yet.
///
/// Directories are created first, then files in manifest order. If any step fails after the
/// root has been created, everything created so far (root included) is removed before the
/// error is returned.
///
/// # Errors
///
/// - [`ScaffoldError::AlreadyExists`] if `target` exists, before anything is written.
/// - [`ScaffoldError::Io`] if a directory or file cannot be created.
pub fn apply(manifest: &WriteManifest, target: &Path) -> Result<ScaffoldReport, ScaffoldError> {
    ensure_absent(target)?;

    create_root(target)?;

    let mut trx = Transaction::<Active>::begin(target.to_path_buf());

    let display_root = target
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| target.to_path_buf());

    for entry in manifest.directories() {
        create_directory(&mut trx, &target.join(&entry.relative_path))?;
    }

    for entry in manifest.files() {
        let final_path = target.join(&entry.relative_path);

        if let Some(parent) = final_path.parent() {
            create_directory(&mut trx, parent)?;
        }

        let contents = entry.content.as_deref().unwrap_or_default();

        write_file(
            &mut trx,
            &final_path,
            &display_root.join(&entry.relative_path),
            contents,
        )?;
    }

    let trx = trx.commit();

    Ok(ScaffoldReport {
        root: trx.root().to_path_buf(),
        files_written: trx.files(),
        directories_created: trx.directories(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DIRECTORIES;

    fn sample_manifest() -> WriteManifest {
        let mut manifest = WriteManifest::new();
        manifest.add_directory("tests").unwrap();
        manifest.add_directory("src/services").unwrap();
        manifest.add_file("server.js", "start();\n").unwrap();
        manifest.add_file("src/config/db.js", "connect();\n").unwrap();
        manifest.add_file("public/.gitkeep", "").unwrap();
        manifest
    }

    #[test]
    fn test_apply_writes_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shop-api");

        let report = apply(&sample_manifest(), &target).unwrap();

        assert_eq!(report.root, target);
        assert_eq!(report.files_written, 3);
        // root, tests, src, src/services, src/config, public
        assert_eq!(report.directories_created, 6);
        assert!(target.join("tests").is_dir());
        assert!(target.join("src/services").is_dir());
        assert_eq!(
            fs::read_to_string(target.join("src/config/db.js")).unwrap(),
            "connect();\n"
        );
        assert_eq!(fs::read(target.join("public/.gitkeep")).unwrap().len(), 0);
    }

    #[test]
    fn test_apply_creates_missing_parents_of_root() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("apps/shop-api");

        apply(&sample_manifest(), &target).unwrap();

        assert!(target.join("server.js").is_file());
    }

    #[test]
    fn test_existing_directory_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shop-api");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "mine").unwrap();

        let result = apply(&sample_manifest(), &target);

        assert!(matches!(result, Err(ScaffoldError::AlreadyExists { .. })));
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "mine");
        assert!(!target.join("server.js").exists());
    }

    #[test]
    fn test_existing_file_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shop-api");
        fs::write(&target, "not a dir").unwrap();

        let result = apply(&sample_manifest(), &target);

        assert!(matches!(result, Err(ScaffoldError::AlreadyExists { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "not a dir");
    }

    #[test]
    fn test_failure_midway_rolls_back_root() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shop-api");

        // "config" is written as a file, so creating "config/db.js" has no parent dir to use
        let mut manifest = WriteManifest::new();
        manifest.add_file("server.js", "start();\n").unwrap();
        manifest.add_file("config", "oops").unwrap();
        manifest.add_file("config/db.js", "connect();\n").unwrap();

        let result = apply(&manifest, &target);

        match result {
            Err(ScaffoldError::Io(error)) => {
                assert_eq!(error.operation, FileOperation::Mkdir);
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
        assert!(!target.exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn test_create_directory_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("shop-api");
        fs::create_dir(&root).unwrap();

        let mut trx = Transaction::<Active>::begin(root.clone());
        for _ in 0..2 {
            for dir in DIRECTORIES {
                create_directory(&mut trx, &root.join(dir)).unwrap();
            }
        }
        let trx = trx.commit();

        // every listed directory plus the root and the implied "src"
        assert_eq!(trx.directories(), DIRECTORIES.len() + 2);
        for dir in DIRECTORIES {
            assert!(root.join(dir).is_dir());
        }
    }

    #[test]
    fn test_resolve_target_is_absolute_under_cwd() {
        let target = resolve_target(Path::new("/work"), "shop-api");

        assert_eq!(target, PathBuf::from("/work/shop-api"));
    }

    #[cfg(unix)]
    #[test]
    fn test_lookup_failure_is_reported_as_metadata_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("x"), "plain file").unwrap();

        let result = ensure_absent(&tmp.path().join("x/y"));

        match result {
            Err(ScaffoldError::Io(error)) => {
                assert_eq!(error.operation, FileOperation::Metadata);
                assert!(error.to_string().contains("Not a directory"));
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shop-api");
        std::os::unix::fs::symlink(tmp.path().join("missing"), &target).unwrap();

        assert!(matches!(
            ensure_absent(&target),
            Err(ScaffoldError::AlreadyExists { .. })
        ));
    }
}
