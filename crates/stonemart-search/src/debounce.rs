//! Trailing-edge debouncer for free-text input.
//!
//! Each handle owns one tokio task. Values pushed within the delay window
//! replace the pending value and restart the timer; only the last value is
//! delivered once input pauses. Dropping the handle aborts the task, so no
//! stale value is delivered after teardown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delay used when the host does not configure one.
pub const DEFAULT_DELAY_MS: u64 = 500;

enum Command<T> {
    Push(T),
    Cancel,
    Flush,
    Finish,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    commands: mpsc::UnboundedSender<Command<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the timer task and returns the handle plus the receiver that
    /// settled values are delivered on.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(delay, command_rx, output));
        (Self { commands, task }, output_rx)
    }

    /// Replaces any pending value and restarts the delay.
    pub fn push(&self, value: T) {
        let _ = self.commands.send(Command::Push(value));
    }

    /// Drops the pending value, if any.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }

    /// Delivers the pending value now instead of waiting out the delay.
    pub fn flush(&self) {
        let _ = self.commands.send(Command::Flush);
    }

    /// Delivers the pending value, if any, then stops the task. The
    /// receiver yields `None` once everything has been drained.
    pub async fn finish(mut self) {
        if self.commands.send(Command::Finish).is_ok() {
            let _ = (&mut self.task).await;
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T>(
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<Command<T>>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    let timer = tokio::time::sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Push(value)) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + delay);
                }
                Some(Command::Cancel) => pending = None,
                Some(Command::Flush) => {
                    if let Some(value) = pending.take() {
                        if output.send(value).is_err() {
                            break;
                        }
                    }
                }
                Some(Command::Finish) => {
                    if let Some(value) = pending.take() {
                        let _ = output.send(value);
                    }
                    break;
                }
                None => break,
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    if output.send(value).is_err() {
                        break;
                    }
                }
            }
        }
    }

    tracing::trace!("debouncer task finished");
}
