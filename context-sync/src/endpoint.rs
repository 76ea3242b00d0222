use thiserror::Error;
use url::Url;

pub const DEFAULT_EVENT_STREAM_PATH: &str = "/gallery/ws";

#[derive(Debug, Error, PartialEq)]
pub enum EndpointError {
	#[error("Unsupported page scheme '{0}', expected 'http' or 'https'")]
	UnsupportedScheme(String),
	#[error("Invalid event stream path: {0}")]
	InvalidPath(#[from] url::ParseError),
}

/// Derives the event stream URL from the origin the gallery page was served from. Secure pages
/// get a secure socket, host and port are kept.
pub fn event_stream_url(page_origin: &Url, path: &str) -> Result<Url, EndpointError> {
	let scheme = match page_origin.scheme() {
		"https" => "wss",
		"http" => "ws",
		other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
	};

	let mut url = page_origin.join(path)?;
	url.set_scheme(scheme)
		.map_err(|()| EndpointError::UnsupportedScheme(page_origin.scheme().to_string()))?;
	url.set_query(None);
	url.set_fragment(None);
	Ok(url)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn secure_page_should_use_secure_socket() {
		let url = event_stream_url(&origin("https://gallery.example.com"), DEFAULT_EVENT_STREAM_PATH).unwrap();

		assert_eq!("wss://gallery.example.com/gallery/ws", url.as_str());
	}

	#[test]
	fn plain_page_should_keep_host_and_port() {
		let url = event_stream_url(&origin("http://192.168.1.20:8080"), DEFAULT_EVENT_STREAM_PATH).unwrap();

		assert_eq!("ws://192.168.1.20:8080/gallery/ws", url.as_str());
	}

	#[test]
	fn page_path_query_and_fragment_should_be_replaced() {
		let url = event_stream_url(
			&origin("https://gallery.example.com/player/index.html?autoplay=1#top"),
			DEFAULT_EVENT_STREAM_PATH,
		)
		.unwrap();

		assert_eq!("wss://gallery.example.com/gallery/ws", url.as_str());
	}

	#[test]
	fn should_use_custom_path() {
		let url = event_stream_url(&origin("http://localhost:3000"), "/events").unwrap();

		assert_eq!("ws://localhost:3000/events", url.as_str());
	}

	#[test]
	fn should_reject_non_http_origins() {
		let error = event_stream_url(&origin("file:///home/user/gallery.html"), DEFAULT_EVENT_STREAM_PATH)
			.expect_err("Derived event stream from file origin");

		assert_eq!(EndpointError::UnsupportedScheme("file".to_string()), error);
	}

	fn origin(url: &str) -> Url {
		Url::parse(url).expect("Invalid origin")
	}
}
