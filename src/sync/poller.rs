/// Background polling task owned by a [`BotControl`](super::BotControl).
///
/// Runs on its own thread: fetch-on-init first (status, monitoring data,
/// AI settings), then a status + monitoring refresh every interval until
/// stopped. Stopping wakes the thread immediately and joins it; a call that
/// is already in flight finishes first, and the mirror is closed before
/// that so its result is dropped.
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Shared;

pub(crate) struct Poller {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn(shared: Arc<Shared>, interval: Duration) -> io::Result<Self> {
        let (stop, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("chimera-poller".to_string())
            .spawn(move || {
                shared.initial_fetch();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !shared.is_alive() {
                                break;
                            }
                            shared.poll_tick();
                        }
                        // Explicit stop, or the owner went away.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
