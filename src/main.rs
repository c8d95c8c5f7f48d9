use std::path::PathBuf;

use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use colored::Colorize;
use create_backend_app::{api, AppError, ScaffoldOptions};

fn cli() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("project-name")
                .help("Name of the project; also the directory created under the current one")
                .value_name("PROJECT_NAME"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print the full error report and debug logs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file with [features] and [defaults] tables")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-health-check")
                .long("no-health-check")
                .help("Leave the GET /health endpoint out of src/app.js")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-env-example")
                .long("no-env-example")
                .help("Do not write .env.example")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Show the tree that would be created without writing anything")
                .action(ArgAction::SetTrue),
        )
}

// The CLI layer should only parse inputs and forward them to library code.
fn main() {
    let matches = cli().get_matches();

    let is_verbose = matches.get_flag("verbose");

    let default_level = if is_verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(error) = run(&matches) {
        report(error, is_verbose);
        std::process::exit(1);
    }
}

fn load_options(args: &ArgMatches) -> Result<ScaffoldOptions, AppError> {
    let mut options = match args.get_one::<PathBuf>("config") {
        Some(path) => ScaffoldOptions::from_file(path)?,
        None => ScaffoldOptions::default(),
    };

    if args.get_flag("no-health-check") {
        options = options.without_health_check();
    }
    if args.get_flag("no-env-example") {
        options = options.without_env_example();
    }

    Ok(options)
}

fn run(args: &ArgMatches) -> Result<(), AppError> {
    let options = load_options(args)?;

    let project_name = args.get_one::<String>("project-name").map(String::as_str);

    let cwd = api::current_dir()?;

    if args.get_flag("dry-run") {
        api::preview_project(project_name, &options, &cwd)?;
    } else {
        api::create_project(project_name, &options, &cwd)?;
    }

    Ok(())
}

fn report(error: AppError, is_verbose: bool) {
    if is_verbose {
        eprintln!("{:?}", miette::Report::new(error));
        return;
    }

    eprintln!("{} {}", "error:".red().bold(), error);

    if matches!(error, AppError::Usage) {
        eprintln!("Usage: {} <project-name>", crate_name!());
    }
}
