use crate::configuration::ConfigurationError;
use crate::endpoint::EndpointError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextSyncError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Invalid log filters: {0}")]
	LogFilters(#[from] tracing_subscriber::filter::ParseError),
	#[error("Failed to set up application context: {0:#}")]
	ApplicationContext(#[from] anyhow::Error),
	#[error("Failed to derive event stream endpoint: {0}")]
	Endpoint(#[from] EndpointError),
	#[error("Invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
