use std::path::PathBuf;
use std::sync::Arc;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json, Value};
use rocket::{Request, State};

use crate::catalog::Catalog;
use crate::common::CapabilityList;
use crate::common::ChannelId;
use crate::common::ChannelList;
use crate::common::LivestreamState;
use crate::common::ShowList;
use crate::livestream::LivestreamController;
use crate::livestream::LivestreamError;
use crate::livestream::StartRequest;


impl<'r> Responder<'r, 'static> for LivestreamError {
	fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
		let status = match self {
			LivestreamError::InvalidRequest => Status::BadRequest,
			LivestreamError::NotFound => Status::NotFound,
			LivestreamError::UnsupportedCapability => Status::BadRequest,
		};
		(status, Json(json!({ "error": self.to_string() }))).respond_to(request)
	}
}

#[get("/channels")]
fn list_channels(catalog: &State<Arc<Catalog>>) -> Json<ChannelList> {
	Json(catalog.channels().to_vec())
}

#[get("/channels/<id>/shows")]
fn list_shows(id: ChannelId, catalog: &State<Arc<Catalog>>) -> Json<ShowList> {
	Json(catalog.shows_for_channel(id))
}

#[get("/channels/<id>/livestreams")]
fn list_livestreams(id: ChannelId, catalog: &State<Arc<Catalog>>) -> Result<Json<CapabilityList>, LivestreamError> {
	let channel = catalog.find_channel_by_id(id).ok_or(LivestreamError::NotFound)?;
	Ok(Json(catalog.get_capabilities(&channel.key).to_vec()))
}

#[get("/livestream/status")]
async fn livestream_status(controller: &State<LivestreamController>) -> Json<LivestreamState> {
	Json(controller.status().await)
}

// An absent or malformed body is a client error like any missing field.
#[post("/livestream/start", data = "<request>")]
async fn start_livestream(
	request: Result<Json<StartRequest>, rocket::serde::json::Error<'_>>,
	controller: &State<LivestreamController>,
) -> Result<Json<LivestreamState>, LivestreamError> {
	let request = request.map_err(|_| LivestreamError::InvalidRequest)?;
	controller.start(request.into_inner()).await.map(Json)
}

#[post("/livestream/stop")]
async fn stop_livestream(controller: &State<LivestreamController>) -> Json<LivestreamState> {
	Json(controller.stop().await)
}

#[get("/health")]
fn health() -> Value {
	json!({ "ok": true })
}

#[options("/<_path..>")]
fn preflight(_path: PathBuf) -> Status {
	Status::NoContent
}

#[catch(404)]
fn not_found() -> Value {
	json!({ "error": "Resource was not found." })
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request) -> Value {
	json!({ "error": status.reason().unwrap_or("Request failed.") })
}



pub fn stage(catalog: Arc<Catalog>, stream_url: String) -> rocket::fairing::AdHoc {
	// The controller holds the state behind a tokio::sync::RwLock so that status reads
	// don't block each other, and a queued start/stop is not starved by new readers.
	let controller = LivestreamController::new(catalog.clone(), stream_url);

	rocket::fairing::AdHoc::on_ignite("Livestream API", move |rocket| async move {
		rocket
			.manage(catalog)
			.manage(controller)
			.register("/", catchers![not_found, default_catcher])
			.mount("/api", routes![
				list_channels,
				list_shows,
				list_livestreams,
				livestream_status,
				start_livestream,
				stop_livestream,
				health,
				preflight,
			])
	})
}



#[cfg(test)]
mod tests {
	use super::*;

	use rocket::http::ContentType;
	use rocket::local::blocking::Client;

	use crate::livestream::DEFAULT_STREAM_URL;

	fn client() -> Client {
		let rocket = rocket::build()
			.attach(stage(Arc::new(Catalog::demo()), DEFAULT_STREAM_URL.to_string()))
			.attach(crate::CORS);
		Client::tracked(rocket).expect("valid rocket instance")
	}

	fn start(client: &Client, body: &str) -> (Status, Value) {
		let response = client.post("/api/livestream/start")
			.header(ContentType::JSON)
			.body(body)
			.dispatch();
		let status = response.status();
		(status, response.into_json().expect("JSON body"))
	}

	fn status(client: &Client) -> Value {
		client.get("/api/livestream/status").dispatch().into_json().expect("JSON body")
	}

	#[test]
	fn health_reports_ok() {
		let client = client();
		let response = client.get("/api/health").dispatch();
		assert_eq!(response.status(), Status::Ok);
		assert_eq!(response.into_json::<Value>().unwrap(), json!({ "ok": true }));
	}

	#[test]
	fn lists_channels_and_shows() {
		let client = client();
		let channels: Value = client.get("/api/channels").dispatch().into_json().unwrap();
		assert_eq!(channels.as_array().unwrap().len(), 5);
		assert_eq!(channels[0], json!({
			"id": 1,
			"key": "ct",
			"name": "Česká televize",
			"description": "Veřejnoprávní TV",
		}));

		let shows: Value = client.get("/api/channels/1/shows").dispatch().into_json().unwrap();
		assert_eq!(shows, json!([
			{ "id": 101, "channelId": 1, "title": "Události", "genre": "News" },
			{ "id": 102, "channelId": 1, "title": "168 hodin", "genre": "News Magazine" },
		]));

		let none: Value = client.get("/api/channels/999/shows").dispatch().into_json().unwrap();
		assert_eq!(none, json!([]));
	}

	#[test]
	fn lists_livestream_capabilities() {
		let client = client();
		let defs: Value = client.get("/api/channels/1/livestreams").dispatch().into_json().unwrap();
		assert_eq!(defs, json!([
			{ "type": "news", "label": "News Livestream" },
			{ "type": "sports", "label": "Sports Livestream" },
		]));

		let empty: Value = client.get("/api/channels/5/livestreams").dispatch().into_json().unwrap();
		assert_eq!(empty, json!([]));

		let response = client.get("/api/channels/999/livestreams").dispatch();
		assert_eq!(response.status(), Status::NotFound);
		assert_eq!(response.into_json::<Value>().unwrap(), json!({ "error": "Channel not found" }));
	}

	#[test]
	fn start_then_reject_unsupported_type() {
		let client = client();
		let (code, body) = start(&client, r#"{"channelId": 1, "type": "news"}"#);
		assert_eq!(code, Status::Ok);
		assert_eq!(body["isLive"], json!(true));
		assert_eq!(body["channelId"], json!(1));
		assert_eq!(body["type"], json!("news"));
		assert!(body["startedAt"].is_string());
		assert_eq!(body["streamUrl"], json!(DEFAULT_STREAM_URL));

		let (code, body) = start(&client, r#"{"channelId": 1, "type": "weather"}"#);
		assert_eq!(code, Status::BadRequest);
		assert_eq!(body, json!({ "error": "This channel does not provide the requested livestream type" }));

		assert_eq!(status(&client)["type"], json!("news"));
	}

	#[test]
	fn start_unknown_channel_is_404() {
		let client = client();
		let (code, body) = start(&client, r#"{"channelId": 999, "type": "news"}"#);
		assert_eq!(code, Status::NotFound);
		assert_eq!(body, json!({ "error": "Channel not found" }));
	}

	#[test]
	fn start_with_missing_fields_is_400() {
		let client = client();
		for body in [r#"{"channelId": 1, "type": ""}"#, r#"{"channelId": 1}"#, r#"{"type": "news"}"#, "{}", "not json", ""] {
			let (code, response) = start(&client, body);
			assert_eq!(code, Status::BadRequest, "body {:?}", body);
			assert_eq!(response, json!({ "error": "channelId and type are required" }));
		}
		assert_eq!(status(&client)["isLive"], json!(false));
	}

	#[test]
	fn stop_clears_state() {
		let client = client();
		start(&client, r#"{"channelId": 3, "type": "fun"}"#);

		let cleared = json!({
			"isLive": false,
			"channelId": null,
			"type": null,
			"startedAt": null,
			"streamUrl": DEFAULT_STREAM_URL,
		});
		for _ in 0..2 {
			let response = client.post("/api/livestream/stop").dispatch();
			assert_eq!(response.status(), Status::Ok);
			assert_eq!(response.into_json::<Value>().unwrap(), cleared);
		}
		assert_eq!(status(&client), cleared);
	}

	#[test]
	fn unknown_route_uses_json_catcher() {
		let client = client();
		let response = client.get("/api/nope").dispatch();
		assert_eq!(response.status(), Status::NotFound);
		assert_eq!(response.into_json::<Value>().unwrap(), json!({ "error": "Resource was not found." }));
	}

	#[test]
	fn non_numeric_channel_id_gets_json_error() {
		let client = client();
		let response = client.get("/api/channels/abc/livestreams").dispatch();
		assert!(response.status().class().is_client_error());
		assert!(response.into_json::<Value>().unwrap()["error"].is_string());
	}

	#[test]
	fn preflight_gets_cors_headers() {
		let client = client();
		let response = client.options("/api/livestream/start").dispatch();
		assert_eq!(response.status(), Status::NoContent);
		assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), Some("*"));
	}
}
