//! Replay of recorded telegram files.
//!
//! A [FileReplay] runs on its own thread with its own [Decoder] and file handle, sending
//! [ReplayEvent]s over a bounded channel at roughly the rate the device produced them.
pub mod framer;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info, span, Level};
use typed_builder::TypedBuilder;

use crate::decoder::{Decoded, Decoder};
use crate::prelude::*;
pub use framer::{Framer, FramerEvent, Telegram, DEFAULT_MAX_MESSAGE_SIZE, MIN_MESSAGE_SIZE};

/// Interval between polls of the pause flag while paused.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Non-message events from a replay.
#[derive(Debug)]
pub enum StatusEvent {
    Started { path: PathBuf },
    /// Replay reached the end of the file.
    NoFurtherData,
    /// Replay was stopped before the end of the file.
    Stopped,
    /// A problem framing or reading the file. [Error::Io] errors end the replay.
    Error(Error),
    Finished { messages: usize },
}

#[derive(Debug)]
pub enum ReplayEvent {
    Message(Box<Decoded>),
    Status(StatusEvent),
}

/// Replays a recorded telegram file.
///
/// # Example
/// ```no_run
/// use stdbin::replay::{FileReplay, ReplayEvent};
///
/// let handle = FileReplay::builder()
///     .path("nav.bin")
///     .speedup(4)
///     .build()
///     .spawn()
///     .unwrap();
/// for event in handle.events().iter() {
///     if let ReplayEvent::Message(decoded) = event {
///         println!("{}", decoded.message);
///     }
/// }
/// handle.join();
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct FileReplay {
    #[builder(setter(into))]
    path: PathBuf,
    /// Divides the delay between messages.
    #[builder(default = 1)]
    speedup: u32,
    /// Upper bound on the bytes read for one telegram; larger declared sizes are clamped.
    #[builder(default = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,
    /// Delay between messages at a speedup of 1. The device produces telegrams at 200Hz.
    #[builder(default = Duration::from_millis(5))]
    base_interval: Duration,
    /// Number of events that may be waiting to be received before the replay blocks.
    #[builder(default = 1024)]
    buffer_size: usize,
}

impl FileReplay {
    /// Delay inserted after each message.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.base_interval / self.speedup.max(1)
    }

    /// Start the replay on a background thread.
    ///
    /// # Errors
    /// [Error::Config] if `speedup` is 0 or `max_message_size` cannot hold a telegram,
    /// [Error::Io] if the thread could not be started. Problems with the file itself are
    /// reported as [StatusEvent::Error]s.
    pub fn spawn(self) -> Result<ReplayHandle> {
        if self.speedup == 0 {
            return Err(Error::Config("speedup must be at least 1".to_string()));
        }
        if self.max_message_size < MIN_MESSAGE_SIZE {
            return Err(Error::Config(format!(
                "max message size must be at least {MIN_MESSAGE_SIZE}"
            )));
        }

        let (tx, rx) = bounded(self.buffer_size.max(1));
        let paused = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));

        let flags = (paused.clone(), stopped.clone());
        let handle = thread::Builder::new()
            .name("stdbin_replay".into())
            .spawn(move || self.run(&tx, &flags.0, &flags.1))?;

        Ok(ReplayHandle {
            events: rx,
            paused,
            stopped,
            handle: Some(handle),
        })
    }

    fn run(self, tx: &Sender<ReplayEvent>, paused: &AtomicBool, stopped: &AtomicBool) {
        let span = span!(Level::DEBUG, "replay", path = %self.path.display());
        let _guard = span.enter();

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(err) => {
                error!("failed to open: {err}");
                send(tx, ReplayEvent::Status(StatusEvent::Error(Error::Io(err))));
                return;
            }
        };
        info!(speedup = self.speedup, "replay started");
        if !send(
            tx,
            ReplayEvent::Status(StatusEvent::Started {
                path: self.path.clone(),
            }),
        ) {
            return;
        }

        let interval = self.interval();
        let mut framer = Framer::new(BufReader::new(file), self.max_message_size);
        let mut decoder = Decoder::new();
        let mut messages = 0usize;

        loop {
            while paused.load(Ordering::Relaxed) && !stopped.load(Ordering::Relaxed) {
                thread::sleep(PAUSE_POLL_INTERVAL);
            }
            if stopped.load(Ordering::Relaxed) {
                info!(messages, "replay stopped");
                send(tx, ReplayEvent::Status(StatusEvent::Stopped));
                break;
            }

            let event = match framer.next_event() {
                FramerEvent::Telegram(telegram) => {
                    let decoded = decoder.decode(&telegram.data);
                    messages += 1;
                    ReplayEvent::Message(Box::new(decoded))
                }
                FramerEvent::Error(err) => {
                    debug!("framing error: {err}");
                    ReplayEvent::Status(StatusEvent::Error(err))
                }
                FramerEvent::NoFurtherData => {
                    info!(messages, skipped = framer.bytes_skipped, "no further data");
                    send(tx, ReplayEvent::Status(StatusEvent::NoFurtherData));
                    break;
                }
            };
            let is_message = matches!(event, ReplayEvent::Message(_));
            if !send(tx, event) {
                return;
            }
            if is_message && !interval.is_zero() {
                thread::sleep(interval);
            }
        }

        send(tx, ReplayEvent::Status(StatusEvent::Finished { messages }));
    }
}

/// Returns false if the receiver has gone away.
fn send(tx: &Sender<ReplayEvent>, event: ReplayEvent) -> bool {
    if tx.send(event).is_err() {
        debug!("replay receiver dropped; exiting");
        return false;
    }
    true
}

/// Controls a running [FileReplay].
///
/// Dropping the handle stops the replay.
pub struct ReplayHandle {
    events: Receiver<ReplayEvent>,
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplayHandle {
    /// Receiver for replay events. The channel is disconnected once the replay ends.
    #[must_use]
    pub fn events(&self) -> &Receiver<ReplayEvent> {
        &self.events
    }

    /// Suspend the replay between messages.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Ask the replay to stop at its next poll point. Messages already sent remain
    /// available from [ReplayHandle::events].
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the replay thread to exit.
    ///
    /// If the replay was stopped, events not yet received are discarded so a replay
    /// blocked on a full channel can finish. Otherwise events are left for the receiver,
    /// or any clone of it, and this blocks until the replay reaches the end of the file;
    /// something must keep receiving for that to happen.
    pub fn join(mut self) {
        if self.stopped.load(Ordering::Relaxed) {
            self.finish();
        } else if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("replay thread panicked");
            }
        }
    }

    /// Join the replay thread, discarding undelivered events.
    fn finish(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        while !handle.is_finished() {
            // Unblock a sender waiting on a full channel
            if self.events.try_recv().is_err() {
                thread::sleep(Duration::from_millis(1));
            }
        }
        if handle.join().is_err() {
            error!("replay thread panicked");
        }
    }
}

impl Drop for ReplayHandle {
    fn drop(&mut self) {
        self.stop();
        self.resume();
        self.finish();
    }
}
