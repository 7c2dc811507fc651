#[macro_use] extern crate rocket;
#[macro_use] extern crate serde_derive;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, Command, value_parser};
use log::info;
use rocket::{Request, Response};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;

use crate::catalog::Catalog;
use crate::livestream::DEFAULT_STREAM_URL;

mod catalog;
mod common;
mod livestream;
mod rest_api;



// Since the UI is served by another server, we may need to setup CORS to allow the UI to make requests to this server.
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
	fn info(&self) -> Info {
		Info {
			name: "Add CORS headers to responses",
			kind: Kind::Response
		}
	}

	async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
		response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
		response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
		response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
		response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
	}
}


#[rocket::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("tv-livestream")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Channel catalog and livestream control API for the TV prototype.")
		.arg(
			Arg::new("catalog")
				.short('c')
				.long("catalog")
				.value_parser(value_parser!(PathBuf))
				.help("YAML file with channels, shows and livestream types; defaults to the built-in demo lineup")
		)
		.arg(
			Arg::new("stream-url")
				.long("stream-url")
				.default_value(DEFAULT_STREAM_URL)
				.help("Playback locator reported for livestreams without their own streamUrl")
		)
		.arg(
			Arg::new("port")
				.short('p')
				.long("port")
				.env("PORT")
				.default_value("4000")
				.value_parser(value_parser!(u16))
				.help("Port to listen on")
		)
		.get_matches();

	let stream_url = matches.get_one::<String>("stream-url").cloned().unwrap_or_default();
	let port = matches.get_one::<u16>("port").copied().unwrap_or(4000);

	// Rocket installs its logger here, so catalog loading below is logged.
	let rocket = rocket::custom(rocket::Config::figment().merge(("port", port)));

	let catalog = match matches.get_one::<PathBuf>("catalog") {
		Some(path) => {
			let catalog = Catalog::from_yaml_file(path)?;
			info!("Loaded catalog from {}", path.display());
			catalog
		},
		None => {
			info!("Using built-in demo catalog");
			Catalog::demo()
		}
	};
	info!("Catalog has {} channels and {} shows", catalog.channels().len(), catalog.show_count());

	rocket
		.attach(rest_api::stage(Arc::new(catalog), stream_url))
		.attach(CORS)
		.launch()
		.await?;

	anyhow::Ok(())
}
