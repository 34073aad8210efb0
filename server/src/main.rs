use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{App, Arg};
use log::{error, info};
use quote_server::server::{self, QuoteServer, ServerConfig};

fn setup_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(fern::log_file("quoteserver.log")?)
        .apply()?;
    Ok(())
}

fn cli() -> App<'static> {
    App::new("quote-server")
        .version("0.1")
        .about("Serves random quotes from flat-file quote databases")
        .mut_arg("help", |arg| arg.short('?'))
        .arg(
            Arg::new("host")
                .short('h')
                .long("host")
                .takes_value(true)
                .default_value("127.0.0.1")
                .help("Address to listen on"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .takes_value(true)
                .default_value("8383")
                .help("Port to listen on"),
        )
        .arg(
            Arg::new("data_dir")
                .short('d')
                .long("data-dir")
                .takes_value(true)
                .default_value(".")
                .help(
                    "Root directory; must hold index.html, add.html, adddb.html and \
                     quote.html (see server/static/). Databases live in its data/ directory",
                ),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging"),
        )
}

#[rocket::main]
async fn main() {
    let matches = cli().get_matches();

    let level = if matches.is_present("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = setup_logger(level) {
        eprintln!("Couldn't set up logging: {}", e);
    }

    let config = ServerConfig {
        host: matches
            .value_of_t::<IpAddr>("host")
            .unwrap_or_else(|e| e.exit()),
        port: matches.value_of_t::<u16>("port").unwrap_or_else(|e| e.exit()),
        root_dir: PathBuf::from(matches.value_of("data_dir").unwrap_or(".")),
    };

    let node = match QuoteServer::start(config.clone()) {
        Ok(node) => Arc::new(node),
        Err(e) => {
            error!("Couldn't start server: {}", e);
            error!(
                "--data-dir must point at a directory holding the page templates, currently {}",
                config.root_dir.display()
            );
            std::process::exit(1);
        }
    };
    info!("Started!");

    if let Err(e) = server::build(node).launch().await {
        error!("Server stopped with an error: {}", e);
        server::remove_pid(&config);
        std::process::exit(1);
    }
}
