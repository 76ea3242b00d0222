use crate::playback::binder::PlaybackBinder;
use crate::playback::catalog::parse_catalog;
use crate::playback::media_id::MediaId;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

/// One line of player input.
#[derive(Debug, PartialEq)]
pub enum PlayerEvent {
	Select(MediaId),
	Progress(f64),
	Loaded,
	Catalog(PathBuf),
}

#[derive(Debug, Error, PartialEq)]
pub enum PlayerEventError {
	#[error("Unknown player command '{0}'")]
	UnknownCommand(String),
	#[error("Player command '{0}' is missing its argument")]
	MissingArgument(&'static str),
	#[error("Player command '{command}' takes no argument, got '{argument}'")]
	UnexpectedArgument { command: &'static str, argument: String },
	#[error("Invalid number of seconds '{0}'")]
	InvalidSeconds(String),
}

impl FromStr for PlayerEvent {
	type Err = PlayerEventError;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let line = line.trim();
		let (command, argument) = line
			.split_once(char::is_whitespace)
			.map_or((line, ""), |(command, argument)| (command, argument.trim()));

		match command {
			"select" => Ok(Self::Select(required_argument("select", argument)?.into())),
			"progress" => parse_seconds(required_argument("progress", argument)?).map(Self::Progress),
			"loaded" if argument.is_empty() => Ok(Self::Loaded),
			"loaded" => Err(PlayerEventError::UnexpectedArgument {
				command: "loaded",
				argument: argument.to_string(),
			}),
			"catalog" => Ok(Self::Catalog(required_argument("catalog", argument)?.into())),
			unknown => Err(PlayerEventError::UnknownCommand(unknown.to_string())),
		}
	}
}

fn required_argument<'argument>(
	command: &'static str,
	argument: &'argument str,
) -> Result<&'argument str, PlayerEventError> {
	if argument.is_empty() {
		Err(PlayerEventError::MissingArgument(command))
	} else {
		Ok(argument)
	}
}

/// Playback offsets are finite and never negative.
pub fn parse_seconds(text: &str) -> Result<f64, PlayerEventError> {
	match text.trim().parse::<f64>() {
		Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
		_ => Err(PlayerEventError::InvalidSeconds(text.to_string())),
	}
}

pub fn resume_line(position: Option<f64>) -> String {
	match position {
		Some(seconds) => format!("resume {seconds}\n"),
		None => "resume none\n".to_string(),
	}
}

/// Drives a [`PlaybackBinder`] from line based player input.
pub struct PlayerBridge {
	binder: PlaybackBinder,
}

impl PlayerBridge {
	pub fn new(binder: PlaybackBinder) -> Self {
		Self { binder }
	}

	/// Runs until the input ends. Lines that can't be parsed are skipped.
	pub async fn run(
		&self,
		mut input: impl AsyncBufRead + Unpin,
		mut output: impl AsyncWrite + Unpin,
	) -> std::io::Result<()> {
		let mut buffer = Vec::new();
		loop {
			buffer.clear();
			if input.read_until(b'\n', &mut buffer).await? == 0 {
				break;
			}

			let Ok(line) = std::str::from_utf8(&buffer) else {
				warn!("Skipping player input that isn't valid UTF-8: {:?}", String::from_utf8_lossy(&buffer));
				continue;
			};
			if line.trim().is_empty() {
				continue;
			}

			match line.parse::<PlayerEvent>() {
				Ok(event) => self.handle_event(event, &mut output).await?,
				Err(error) => warn!("Skipping player input '{}': {error}", line.trim_end()),
			}
		}

		info!("Player input ended.");
		Ok(())
	}

	async fn handle_event(&self, event: PlayerEvent, output: &mut (impl AsyncWrite + Unpin)) -> std::io::Result<()> {
		match event {
			PlayerEvent::Select(id) => self.binder.select_media(id),
			PlayerEvent::Progress(seconds) => self.binder.on_progress(seconds).await,
			PlayerEvent::Loaded => {
				let line = resume_line(self.binder.resume_position().await);
				output.write_all(line.as_bytes()).await?;
				output.flush().await?;
			}
			PlayerEvent::Catalog(path) => self.import_catalog(&path).await,
		}
		Ok(())
	}

	async fn import_catalog(&self, path: &Path) {
		let json = match tokio::fs::read_to_string(path).await {
			Ok(json) => json,
			Err(error) => {
				error!("Failed to read catalog '{}': {error}", path.display());
				return;
			}
		};

		match parse_catalog(&json) {
			Ok(items) => self.binder.refresh_catalog(&items).await,
			Err(error) => error!("Failed to parse catalog '{}': {error}", path.display()),
		}
	}
}
