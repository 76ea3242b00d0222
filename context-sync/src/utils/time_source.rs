use futures_util::StreamExt;
use pin_project::pin_project;
use std::any::type_name;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};
use tokio_stream::wrappers::BroadcastStream;

/// Source of all timers of the client.
///
/// The default uses tokio timers. [`TimeSource::test`] creates named test clocks that only move
/// when [`TimeSource::advance_time`] is called, so timer behaviour can be tested deterministically.
#[derive(Clone, Default)]
pub struct TimeSource {
	test_time_sources: Option<Arc<TestTimeSources>>,
}

#[derive(Default)]
pub struct TestTimeSources {
	named_time_sources: parking_lot::Mutex<BTreeMap<&'static str, Arc<TestTimeSource>>>,
}

pub struct TestTimeSource {
	time_sender: broadcast::Sender<Duration>,
	notification: Notify,
}

impl Default for TestTimeSource {
	fn default() -> Self {
		Self {
			time_sender: broadcast::channel(16).0,
			notification: Default::default(),
		}
	}
}

impl TestTimeSources {
	fn subscribe(&self, name: &'static str) -> BroadcastStream<Duration> {
		let mut time_sources = self.named_time_sources.lock();
		let time_source = time_sources.entry(name).or_default();
		let receiver = BroadcastStream::new(time_source.time_sender.subscribe());

		time_source.notification.notify_one();

		receiver
	}

	fn interval_at(&self, name: &'static str, start: Duration, period: Duration) -> TestInterval {
		TestInterval {
			current_time: Duration::ZERO,
			next_deadline: start,
			period,
			receiver: self.subscribe(name),
		}
	}

	fn sleep(&self, name: &'static str, duration: Duration) -> TestSleep {
		TestSleep {
			current_time: Duration::ZERO,
			deadline: duration,
			receiver: self.subscribe(name),
		}
	}

	#[cfg(test)]
	fn advance_time(&self, name: &'static str, by_duration: Duration) {
		let time_sources = self.named_time_sources.lock();
		let time_source = time_sources.get(name).expect("No time sender of this name");
		let _ = time_source.time_sender.send(by_duration); // ignore error so this works even without anyone waiting
	}

	#[cfg(test)]
	async fn wait_for_time_request(&self, name: &'static str) {
		let time_source = {
			// subscope so the MutexGuard isn't held across an await point
			let mut time_sources = self.named_time_sources.lock();
			time_sources.entry(name).or_default().clone()
		};

		time_source.notification.notified().await;
	}

	#[cfg(test)]
	fn pending_timers(&self, name: &'static str) -> usize {
		self.named_time_sources
			.lock()
			.get(name)
			.map_or(0, |time_source| time_source.time_sender.receiver_count())
	}
}

impl TimeSource {
	#[cfg(test)]
	pub fn test() -> Self {
		Self {
			test_time_sources: Some(Default::default()),
		}
	}

	pub fn interval_at(&self, name: &'static str, start: Duration, period: Duration) -> Interval {
		match &self.test_time_sources {
			None => Interval::Tokio(tokio::time::interval_at(tokio::time::Instant::now() + start, period)),
			Some(test_time_sources) => Interval::Test(test_time_sources.interval_at(name, start, period)),
		}
	}

	pub fn sleep(&self, name: &'static str, duration: Duration) -> Sleep {
		match &self.test_time_sources {
			None => Sleep::Tokio(tokio::time::sleep(duration)),
			Some(test_time_sources) => Sleep::Test(test_time_sources.sleep(name, duration)),
		}
	}

	#[cfg(test)]
	pub fn advance_time(&self, name: &'static str, by_duration: Duration) {
		self.test_time_sources
			.as_ref()
			.expect("Can only be called in test mode.")
			.advance_time(name, by_duration);
	}

	/// Resolves once a timer of the given name has been requested. A request that happened before
	/// this is called counts as well.
	#[cfg(test)]
	pub async fn wait_for_time_request(&self, name: &'static str) {
		match &self.test_time_sources {
			None => (),
			Some(test_time_sources) => test_time_sources.wait_for_time_request(name).await,
		}
	}

	/// Timers of the given name that have been requested and not dropped yet.
	#[cfg(test)]
	pub fn pending_timers(&self, name: &'static str) -> usize {
		self.test_time_sources
			.as_ref()
			.expect("Can only be called in test mode.")
			.pending_timers(name)
	}
}

pub enum Interval {
	Tokio(tokio::time::Interval),
	Test(TestInterval),
}

impl Interval {
	pub async fn tick(&mut self) {
		match self {
			Interval::Tokio(interval) => {
				interval.tick().await;
			}
			Interval::Test(interval) => interval
				.next()
				.await
				.unwrap_or_else(|| panic!("{} dropped prematurely.", type_name::<TimeSource>())),
		}
	}
}

pub struct TestInterval {
	current_time: Duration,
	next_deadline: Duration,
	period: Duration,
	receiver: BroadcastStream<Duration>,
}

impl futures_util::Stream for TestInterval {
	type Item = ();

	fn poll_next(self: Pin<&mut Self>, context: &mut Context) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();
		if !receive_time_deltas(&mut this.receiver, &mut this.current_time, context) {
			return Poll::Ready(None);
		}

		if this.current_time >= this.next_deadline {
			this.next_deadline += this.period;
			return Poll::Ready(Some(()));
		}

		Poll::Pending
	}
}

#[pin_project(project = ProjectedSleep)]
pub enum Sleep {
	Tokio(#[pin] tokio::time::Sleep),
	Test(#[pin] TestSleep),
}

impl Future for Sleep {
	type Output = ();

	fn poll(self: Pin<&mut Self>, context: &mut Context) -> Poll<Self::Output> {
		match self.project() {
			ProjectedSleep::Tokio(sleep) => sleep.poll(context),
			ProjectedSleep::Test(sleep) => sleep.poll(context),
		}
	}
}

pub struct TestSleep {
	current_time: Duration,
	deadline: Duration,
	receiver: BroadcastStream<Duration>,
}

impl Future for TestSleep {
	type Output = ();

	fn poll(self: Pin<&mut Self>, context: &mut Context) -> Poll<Self::Output> {
		let this = self.get_mut();
		let time_source_alive = receive_time_deltas(&mut this.receiver, &mut this.current_time, context);
		assert!(
			time_source_alive,
			"{} dropped prematurely.",
			type_name::<TimeSource>()
		);

		if this.current_time >= this.deadline {
			Poll::Ready(())
		} else {
			Poll::Pending
		}
	}
}

/// Adds up every time delta that has been sent so far. Returns `false` if the sending side is gone.
fn receive_time_deltas(
	receiver: &mut BroadcastStream<Duration>,
	current_time: &mut Duration,
	context: &mut Context,
) -> bool {
	loop {
		match receiver.poll_next_unpin(context) {
			Poll::Ready(Some(Ok(time_delta))) => *current_time += time_delta,
			Poll::Ready(Some(Err(lagged))) => panic!("Test clock lagged behind: {lagged}"),
			Poll::Ready(None) => return false,
			Poll::Pending => return true,
		}
	}
}
