//! oxide-expose CLI
//!
//! Inspects a route table: lists routes, matches paths and builds URLs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_expose::{Config, Expose, HttpError, Method, Request, Response, Router};

/// Inspect typed URL routes.
#[derive(Parser)]
#[command(name = "oxide-expose")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route table file (JSON).
    #[arg(short, long, env = "OXIDE_EXPOSE_ROUTES", default_value = "routes.json")]
    routes: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in precedence order.
    Routes,

    /// Match a path against the table.
    Match {
        /// Path to match, optionally with a query string.
        path: String,

        /// Only consider routes accepting this method.
        #[arg(short, long)]
        method: Option<Method>,
    },

    /// Build the URL of a route.
    Url {
        /// Route name, or `static`.
        name: String,

        /// Positional arguments.
        args: Vec<String>,

        /// Query parameter as `key=value` (repeatable).
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// Language of the generated URL.
        #[arg(short, long)]
        language: Option<String>,

        /// Mount prefix.
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

/// Route table file.
#[derive(Deserialize)]
struct RouteFile {
    /// Application module, used for default route names.
    module: String,
    #[serde(default)]
    config: Config,
    routes: Vec<RouteEntry>,
}

#[derive(Deserialize)]
struct RouteEntry {
    handler: String,
    path: Option<String>,
    name: Option<String>,
    #[serde(default)]
    methods: Vec<String>,
}

impl RouteFile {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading route table {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing route table {}", path.display()))
    }

    fn into_router(self) -> anyhow::Result<Router> {
        let mut builder = Router::builder(self.module).config(self.config);
        for entry in self.routes {
            let methods = entry
                .methods
                .iter()
                .map(|m| m.parse::<Method>().map_err(anyhow::Error::msg))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let mut expose = Expose::new(entry.handler, inert).methods(&methods);
            if let Some(path) = entry.path {
                expose = expose.path(path);
            }
            if let Some(name) = entry.name {
                expose = expose.name(name);
            }
            builder = builder.expose(expose)?;
        }
        Ok(builder.build())
    }
}

/// Routes loaded from a file have no behavior of their own.
async fn inert(_req: Request) -> Result<Response, HttpError> {
    Ok(Response::ok())
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = RouteFile::load(&cli.routes)?.into_router()?;
    info!("Loaded {} routes from {}", router.routes().count(), cli.routes.display());

    match cli.command {
        Commands::Routes => {
            for route in router.routes() {
                let methods = if route.methods().is_empty() {
                    "*".to_string()
                } else {
                    route
                        .methods()
                        .iter()
                        .map(Method::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                };
                println!("{}\t{}\t{}", route.name(), methods, route.template().source());
            }
        }

        Commands::Match { path, method } => {
            let request = Request::from_uri(method.unwrap_or(Method::Get), &path);
            let matched = if method.is_some() {
                router.match_request(&request)
            } else {
                router.match_path(&request.path)
            };
            match matched {
                Some(matched) => {
                    let output = serde_json::json!({
                        "route": matched.route.name(),
                        "language": matched.language,
                        "args": matched.args,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                None => {
                    println!("no route");
                    std::process::exit(1);
                }
            }
        }

        Commands::Url {
            name,
            args,
            query,
            language,
            prefix,
        } => {
            if let Some(prefix) = prefix {
                router.bind(&prefix)?;
            }
            let mut url = router.url(name).args(args);
            for (key, value) in query {
                url = url.query(key, value);
            }
            if let Some(language) = language {
                url = url.language(language);
            }
            println!("{}", url.build()?);
        }
    }

    Ok(())
}
