use crate::{
    config::ScaffoldOptions,
    manifest::{ManifestError, WriteManifest, DIRECTORIES},
};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Error occurred attempting to initialize tera instance")]
    #[diagnostic(code(create_backend_app::template::tera_instance_initialization))]
    TeraInstanceInitialization {
        #[source]
        source: tera::Error,
    },

    #[error("Error occurred building the template context")]
    #[diagnostic(code(create_backend_app::template::context))]
    Context {
        #[source]
        source: tera::Error,
    },

    #[error("Error occurred attempting to render template '{name}'")]
    #[diagnostic(code(create_backend_app::template::render))]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Error occurred serializing package.json")]
    #[diagnostic(code(create_backend_app::template::package_json))]
    PackageJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),
}

const TERA_FILE_EXTENSION: &str = "tera";

/// Output path and template source for every rendered file, in write order.
const TEMPLATES: &[(&str, &str)] = &[
    ("server.js", include_str!("../templates/server.js.tera")),
    ("src/app.js", include_str!("../templates/src/app.js.tera")),
    ("src/config/db.js", include_str!("../templates/src/config/db.js.tera")),
    (
        "src/config/constants.js",
        include_str!("../templates/src/config/constants.js.tera"),
    ),
    (
        "src/helpers/asyncHandler.js",
        include_str!("../templates/src/helpers/asyncHandler.js.tera"),
    ),
    (
        "src/helpers/customError.js",
        include_str!("../templates/src/helpers/customError.js.tera"),
    ),
    (
        "src/helpers/developmentError.js",
        include_str!("../templates/src/helpers/developmentError.js.tera"),
    ),
    (
        "src/helpers/productionError.js",
        include_str!("../templates/src/helpers/productionError.js.tera"),
    ),
    (
        "src/helpers/globalError.js",
        include_str!("../templates/src/helpers/globalError.js.tera"),
    ),
    (
        "src/helpers/apiResponse.js",
        include_str!("../templates/src/helpers/apiResponse.js.tera"),
    ),
    (
        "src/controllers/userController.js",
        include_str!("../templates/src/controllers/userController.js.tera"),
    ),
    (
        "src/controllers/authController.js",
        include_str!("../templates/src/controllers/authController.js.tera"),
    ),
    (
        "src/routes/index.js",
        include_str!("../templates/src/routes/index.js.tera"),
    ),
    (
        "src/routes/api/userRoutes.js",
        include_str!("../templates/src/routes/api/userRoutes.js.tera"),
    ),
    (
        "src/routes/api/authRoutes.js",
        include_str!("../templates/src/routes/api/authRoutes.js.tera"),
    ),
    ("src/models/User.js", include_str!("../templates/src/models/User.js.tera")),
    ("src/models/Post.js", include_str!("../templates/src/models/Post.js.tera")),
    (".gitignore", include_str!("../templates/gitignore.tera")),
    ("README.md", include_str!("../templates/README.md.tera")),
];

const ENV_EXAMPLE: (&str, &str) = (".env.example", include_str!("../templates/env.example.tera"));

/// Everything the templates may interpolate. Nothing else reaches the tera context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub project_name: String,
    pub include_health_check: bool,
    pub include_env_example: bool,
    pub port: u16,
    pub api_version: String,
    pub mongo_host: String,
}
impl TemplateParams {
    pub fn new(project_name: &str, options: &ScaffoldOptions) -> Self {
        Self {
            project_name: project_name.to_string(),
            include_health_check: options.features.health_check,
            include_env_example: options.features.env_example,
            port: options.defaults.port,
            api_version: options.defaults.api_version.clone(),
            mongo_host: options.defaults.mongo_host.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson<'a> {
    name: &'a str,
    version: &'static str,
    private: bool,
    main: &'static str,
    scripts: IndexMap<&'static str, &'static str>,
    dependencies: IndexMap<&'static str, &'static str>,
    dev_dependencies: IndexMap<&'static str, &'static str>,
}
impl<'a> PackageJson<'a> {
    fn for_project(name: &'a str) -> Self {
        Self {
            name,
            version: "0.1.0",
            private: true,
            main: "server.js",
            scripts: IndexMap::from([("start", "node server.js"), ("dev", "nodemon server.js")]),
            dependencies: IndexMap::from([
                ("express", "^4.18.2"),
                ("mongoose", "^7.0.0"),
                ("dotenv", "^16.0.0"),
                ("cors", "^2.8.5"),
                ("morgan", "^1.10.0"),
            ]),
            dev_dependencies: IndexMap::from([("nodemon", "^3.1.10")]),
        }
    }

    fn render(&self) -> Result<String, TemplateError> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|error| TemplateError::PackageJson { source: error })?;
        json.push('\n');
        Ok(json)
    }
}

fn template_name(path: &str) -> String {
    format!("{}.{}", path, TERA_FILE_EXTENSION)
}

/// Escapes a string for use between double quotes in a JS source file.
fn js_string(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("js_string expects a string"))?;

    let quoted = serde_json::to_string(text).map_err(tera::Error::msg)?;

    Ok(Value::String(quoted[1..quoted.len() - 1].to_string()))
}

fn make_tera() -> Result<Tera, TemplateError> {
    let mut tera = Tera::default();

    // generated sources are not markup
    tera.autoescape_on(vec![]);
    tera.register_filter("js_string", js_string);

    let sources = TEMPLATES
        .iter()
        .chain(std::iter::once(&ENV_EXAMPLE))
        .map(|(path, source)| (template_name(path), *source));

    tera.add_raw_templates(sources)
        .map_err(|error| TemplateError::TeraInstanceInitialization { source: error })?;

    Ok(tera)
}

fn render(tera: &Tera, path: &str, ctx: &Context) -> Result<String, TemplateError> {
    let name = template_name(path);

    tera.render(&name, ctx)
        .map_err(|error| TemplateError::Render {
            name,
            source: error,
        })
}

/// Builds the [`WriteManifest`] for a project: the static directory list first, then every
/// rendered file. Pure; nothing touches the filesystem.
pub fn build_manifest(params: &TemplateParams) -> Result<WriteManifest, TemplateError> {
    let tera = make_tera()?;

    let ctx =
        Context::from_serialize(params).map_err(|error| TemplateError::Context { source: error })?;

    let mut manifest = WriteManifest::new();

    for dir in DIRECTORIES {
        manifest.add_directory(*dir)?;
    }

    for (path, _) in TEMPLATES {
        let rendered = render(&tera, path, &ctx)?;
        manifest.add_file(*path, rendered)?;
    }

    manifest.add_file(
        "package.json",
        PackageJson::for_project(&params.project_name).render()?,
    )?;

    if params.include_env_example {
        let (path, _) = ENV_EXAMPLE;
        manifest.add_file(path, render(&tera, path, &ctx)?)?;
    }

    manifest.add_file("public/.gitkeep", "")?;

    log::debug!(
        "built manifest for '{}' with {} entries",
        params.project_name,
        manifest.len()
    );

    Ok(manifest)
}
