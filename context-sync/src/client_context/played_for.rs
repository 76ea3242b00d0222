/// Renders a playback offset for humans, e.g. `1 hour 2 minutes 5 seconds`.
///
/// Fractions of a second are dropped. Zero-valued units are left out, except for an offset of
/// less than a second, which renders as `0 seconds`.
pub fn format_played_for(seconds: f64) -> String {
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let total_seconds = if seconds.is_finite() && seconds > 0.0 {
		seconds.floor() as u64
	} else {
		0
	};

	let hours = total_seconds / 3600;
	let minutes = total_seconds % 3600 / 60;
	let seconds = total_seconds % 60;

	let parts = [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
		.into_iter()
		.filter(|(amount, _)| *amount > 0)
		.map(|(amount, unit)| pluralize(amount, unit))
		.collect::<Vec<_>>();

	if parts.is_empty() {
		pluralize(0, "second")
	} else {
		parts.join(" ")
	}
}

/// Reads an offset rendered by [`format_played_for`] back into seconds. Returns `None` for
/// anything that is not a sequence of `<amount> <unit>` pairs.
pub fn parse_played_for(text: &str) -> Option<f64> {
	let mut words = text.split_whitespace();
	let mut total_seconds = 0u64;
	let mut parsed_any = false;

	while let Some(amount) = words.next() {
		let amount = amount.parse::<u64>().ok()?;
		let unit_seconds = match words.next()? {
			"hour" | "hours" => 3600,
			"minute" | "minutes" => 60,
			"second" | "seconds" => 1,
			_ => return None,
		};
		total_seconds = total_seconds.checked_add(amount.checked_mul(unit_seconds)?)?;
		parsed_any = true;
	}

	#[allow(clippy::cast_precision_loss)]
	parsed_any.then_some(total_seconds as f64)
}

fn pluralize(amount: u64, unit: &str) -> String {
	if amount == 1 {
		format!("{amount} {unit}")
	} else {
		format!("{amount} {unit}s")
	}
}
