// host stand-in for the hardware timer interrupt: a dedicated thread that
// fires the tick callback off a crossbeam ticker until told to stop

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Sender};

use crate::hal::{PeriodicTimer, TickCallback, TimerError};

struct Running {
    stop: Sender<()>,
    handle: JoinHandle<()>,
    interval: Duration,
}

#[derive(Default)]
pub struct ThreadTimer {
    running: Option<Running>,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.running.as_ref().map(|r| r.interval)
    }
}

impl PeriodicTimer for ThreadTimer {
    fn attach(&mut self, interval: Duration, callback: TickCallback) -> Result<(), TimerError> {
        if interval.is_zero() {
            return Err(TimerError::InvalidInterval(interval));
        }
        if self.running.is_some() {
            return Err(TimerError::AlreadyAttached);
        }

        let (stop, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("cvseq-clock".into())
            .spawn(move || {
                // tick() keeps a fixed schedule, a slow callback doesn't drift it
                let ticker = crossbeam_channel::tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => callback(),
                    }
                }
            })?;

        self.running = Some(Running { stop, handle, interval });
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop.send(());
            if running.handle.join().is_err() {
                log::error!("clock thread panicked");
            }
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.detach();
    }
}
