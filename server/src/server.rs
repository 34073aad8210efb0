use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{error, info, warn};
use rocket::fairing::AdHoc;
use rocket::http::uri::Origin;
use rocket::http::{ContentType, Status};
use rocket::{catch, catchers, get, post, routes, Build, Rocket, State};

use crate::error::QuoteError;
use crate::query::QueryParams;
use crate::registry::Registry;
use crate::templates::Templates;
use crate::util;

pub const DEFAULT_PORT: u16 = 8383;

type Html = (ContentType, String);
type Accepted = (Status, &'static str);

// Routes ---------------------------------------------------------------------

#[get("/")]
async fn index(server: &State<Arc<QuoteServer>>) -> Html {
    let names = server.registry.names().await;
    let hits = server.counter.fetch_add(1, Ordering::SeqCst);
    (ContentType::HTML, server.templates.render_index(&names, hits))
}

#[get("/quote/<name>")]
async fn quote(name: &str, server: &State<Arc<QuoteServer>>) -> Result<Html, QuoteError> {
    let name = name.to_lowercase();
    let text = server.registry.random_quote(&name).await?;
    Ok((ContentType::HTML, server.templates.render_quote(&name, &text)))
}

#[get("/add")]
async fn add(server: &State<Arc<QuoteServer>>) -> Html {
    let names = server.registry.names().await;
    (ContentType::HTML, server.templates.render_add(&names))
}

#[get("/adddb")]
fn add_db(server: &State<Arc<QuoteServer>>) -> Html {
    (ContentType::HTML, server.templates.render_add_database())
}

#[get("/adddatabase")]
async fn add_database(
    uri: &Origin<'_>,
    server: &State<Arc<QuoteServer>>,
) -> Result<Accepted, QuoteError> {
    server.add_database(uri).await
}

#[post("/adddatabase")]
async fn add_database_post(
    uri: &Origin<'_>,
    server: &State<Arc<QuoteServer>>,
) -> Result<Accepted, QuoteError> {
    server.add_database(uri).await
}

#[get("/addquote")]
async fn add_quote(
    uri: &Origin<'_>,
    server: &State<Arc<QuoteServer>>,
) -> Result<Accepted, QuoteError> {
    server.add_quote(uri).await
}

#[post("/addquote")]
async fn add_quote_post(
    uri: &Origin<'_>,
    server: &State<Arc<QuoteServer>>,
) -> Result<Accepted, QuoteError> {
    server.add_quote(uri).await
}

#[catch(400)]
fn bad_request() -> (ContentType, &'static str) {
    (ContentType::Plain, "Error 400, bad request.")
}

#[catch(404)]
fn not_found() -> (ContentType, &'static str) {
    (ContentType::Plain, "Error 404, file not found.")
}

#[catch(500)]
fn internal_error() -> (ContentType, &'static str) {
    (ContentType::Plain, "Error 500, internal server error.")
}

// Server ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub root_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            root_dir: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.root_dir.join("data")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root_dir.join("run").join("quoteserver.pid")
    }

    pub fn counter_file(&self) -> PathBuf {
        self.data_dir().join("hits.counter")
    }
}

pub struct QuoteServer {
    config: ServerConfig,
    registry: Registry,
    templates: Templates,
    counter: AtomicU64,
}

impl QuoteServer {
    /// Prepares the data directory, writes the PID file, then loads templates and
    /// every database. Any failure here is a configuration error and leaves no PID
    /// file behind.
    pub fn start(config: ServerConfig) -> Result<Self, QuoteError> {
        let data_dir = config.data_dir();
        fs::create_dir_all(&data_dir).map_err(QuoteError::io(&data_dir))?;
        write_pid(&config)?;

        let loaded = Templates::load(&config.root_dir)
            .and_then(|templates| Ok((templates, Registry::load(data_dir)?)));
        let (templates, registry) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                remove_pid(&config);
                return Err(e);
            }
        };
        let counter = read_counter(&config);

        Ok(Self {
            config,
            registry,
            templates,
            counter: AtomicU64::new(counter),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn hits(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    async fn add_database(&self, uri: &Origin<'_>) -> Result<Accepted, QuoteError> {
        let query = uri.query();
        let params = QueryParams::parse(query.as_ref().map(|q| q.as_str()))?;
        self.registry.create(params.require("name")?).await?;
        Ok((Status::Accepted, ""))
    }

    async fn add_quote(&self, uri: &Origin<'_>) -> Result<Accepted, QuoteError> {
        let query = uri.query();
        let params = QueryParams::parse(query.as_ref().map(|q| q.as_str()))?;
        let name = params.require("name")?.to_lowercase();
        let text = params.require("quote")?;
        self.registry.add_quote(&name, text).await?;
        Ok((Status::Accepted, ""))
    }

    /// Persists every database and the hit counter, then removes the PID file.
    /// Failures are logged and do not stop the remaining steps.
    pub async fn shutdown(&self) {
        info!("Shutting down.");
        let failures = self.registry.save_all().await;
        if failures > 0 {
            error!("{} databases could not be saved", failures);
        }

        let counter_file = self.config.counter_file();
        if let Err(e) = util::write_file(&counter_file, &self.hits().to_string()) {
            error!("Failed to write hit counter: {}", e);
        }

        remove_pid(&self.config);
    }
}

fn write_pid(config: &ServerConfig) -> Result<(), QuoteError> {
    let pid_file = config.pid_file();
    if let Some(run_dir) = pid_file.parent() {
        fs::create_dir_all(run_dir).map_err(QuoteError::io(run_dir))?;
    }
    util::write_file(&pid_file, &std::process::id().to_string())
}

/// Deletes the PID file written at startup. A file that is already gone is fine.
pub fn remove_pid(config: &ServerConfig) {
    let pid_file = config.pid_file();
    match fs::remove_file(&pid_file) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", pid_file.display(), e),
    }
}

fn read_counter(config: &ServerConfig) -> u64 {
    let counter_file = config.counter_file();
    match fs::read_to_string(&counter_file) {
        Ok(text) => text.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unreadable hit counter {:?}", text);
            0
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No hit counter at {}, starting from zero", counter_file.display());
            0
        }
        Err(e) => {
            warn!(
                "Couldn't read hit counter {}, starting from zero: {}",
                counter_file.display(),
                e
            );
            0
        }
    }
}

/// Builds the Rocket instance serving `server`, with a shutdown fairing that
/// persists state when Rocket stops.
pub fn build(server: Arc<QuoteServer>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", server.config.host))
        .merge(("port", server.config.port));
    rocket::custom(figment)
        .manage(server)
        .mount(
            "/",
            routes![
                index,
                quote,
                add,
                add_db,
                add_database,
                add_database_post,
                add_quote,
                add_quote_post,
            ],
        )
        .register("/", catchers![bad_request, not_found, internal_error])
        .attach(AdHoc::on_shutdown("Persist quote databases", |rocket| {
            Box::pin(async move {
                match rocket.state::<Arc<QuoteServer>>() {
                    Some(server) => server.shutdown().await,
                    None => error!("Quote server state missing at shutdown"),
                }
            })
        }))
}
