use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::{
    config::{self, ScaffoldOptions},
    errors::{FileOperation, IoError},
    manifest::WriteManifest,
    preview::preview_as_tree,
    scaffold::{self, ScaffoldReport},
    template::{self, TemplateParams},
    utils::is_valid_package_name,
};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AppError {
    #[error("missing required argument <project-name>")]
    #[diagnostic(
        code(create_backend_app::usage),
        help("Usage: create-backend-app <project-name>")
    )]
    Usage,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] template::TemplateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scaffold(#[from] scaffold::ScaffoldError),
}

/// Working directory the project name is resolved against.
pub fn current_dir() -> Result<PathBuf, AppError> {
    let cwd = std::env::current_dir()
        .map_err(|error| IoError::new(FileOperation::CurrentDir, PathBuf::from("."), error))?;

    Ok(cwd)
}

/// Validates the name, resolves and checks the target, and renders the manifest.
/// Nothing here touches the filesystem beyond a metadata lookup.
fn prepare<'a>(
    project_name: Option<&'a str>,
    options: &ScaffoldOptions,
    cwd: &Path,
) -> Result<(&'a str, PathBuf, WriteManifest), AppError> {
    // used exactly as given; surrounding whitespace is part of the directory name
    let project_name = project_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(AppError::Usage)?;

    if !is_valid_package_name(project_name) {
        log::warn!(
            "'{}' is not a valid npm package name; package.json will need editing before publishing",
            project_name
        );
    }

    let target = scaffold::resolve_target(cwd, project_name);

    log::debug!("resolved target: {}", target.display());

    scaffold::ensure_absent(&target)?;

    let manifest = template::build_manifest(&TemplateParams::new(project_name, options))?;

    Ok((project_name, target, manifest))
}

/// Scaffolds a new backend project named `project_name` under `cwd`.
///
/// # Errors
///
/// Returns an [`AppError`] if:
///
/// - `project_name` is missing or blank.
/// - The resolved target already exists (nothing is written).
/// - A template fails to render.
/// - A directory or file cannot be created or written to (anything created is rolled back).
pub fn create_project(
    project_name: Option<&str>,
    options: &ScaffoldOptions,
    cwd: &Path,
) -> Result<ScaffoldReport, AppError> {
    let (project_name, target, manifest) = prepare(project_name, options, cwd)?;

    let report = scaffold::apply(&manifest, &target)?;

    print_summary(&report, project_name, options);

    Ok(report)
}

/// Prints the tree [`create_project`] would write, without writing it.
///
/// # Errors
///
/// Same guards as [`create_project`]: a missing name or an existing target still fail.
pub fn preview_project(
    project_name: Option<&str>,
    options: &ScaffoldOptions,
    cwd: &Path,
) -> Result<WriteManifest, AppError> {
    let (_, target, manifest) = prepare(project_name, options, cwd)?;

    preview_as_tree(&manifest, &target);

    Ok(manifest)
}

fn print_summary(report: &ScaffoldReport, project_name: &str, options: &ScaffoldOptions) {
    println!(
        "\n✅ Project created at {} ({} files, {} directories)",
        report.root.display().to_string().bold(),
        report.files_written,
        report.directories_created
    );
    println!("Next steps:");
    println!("  cd {}", project_name);
    println!("  npm install");
    if options.features.env_example {
        println!("  cp .env.example .env");
        println!("  npm run dev");
    } else {
        println!("  create a .env file with MONGO_URI and run npm run dev");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_name_is_usage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let options = ScaffoldOptions::default();

        for name in [None, Some(""), Some("   ")] {
            let result = create_project(name, &options, tmp.path());
            assert!(matches!(result, Err(AppError::Usage)));
        }

        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_project_reports_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let options = ScaffoldOptions::default();

        let report = create_project(Some("shop-api"), &options, tmp.path()).unwrap();

        let manifest =
            template::build_manifest(&TemplateParams::new("shop-api", &options)).unwrap();
        assert_eq!(report.root, tmp.path().join("shop-api"));
        assert_eq!(report.files_written, manifest.files().count());
    }

    #[test]
    fn test_second_run_is_already_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let options = ScaffoldOptions::default();

        create_project(Some("shop-api"), &options, tmp.path()).unwrap();
        let result = create_project(Some("shop-api"), &options, tmp.path());

        assert!(matches!(
            result,
            Err(AppError::Scaffold(scaffold::ScaffoldError::AlreadyExists { .. }))
        ));
    }

    #[test]
    fn test_name_is_not_trimmed() {
        let tmp = tempfile::tempdir().unwrap();

        let report =
            create_project(Some(" shop "), &ScaffoldOptions::default(), tmp.path()).unwrap();

        assert_eq!(report.root, tmp.path().join(" shop "));
        assert!(tmp.path().join(" shop ").join("server.js").is_file());
        assert!(!tmp.path().join("shop").exists());
    }

    #[test]
    fn test_preview_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();

        let manifest =
            preview_project(Some("shop-api"), &ScaffoldOptions::default(), tmp.path()).unwrap();

        assert!(manifest.get("server.js").is_some());
        assert!(!tmp.path().join("shop-api").exists());
    }
}
