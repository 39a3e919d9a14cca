//! In-app playback of downloaded narration audio through the default output device.

use std::{
    io::Cursor,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use anyhow::{Context, Result};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Set by [`AudioPlayer::stop`] or by the next [`AudioPlayer::begin`].
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Plays one clip at a time; starting a new clip stops the previous one.
#[derive(Clone, Default)]
pub struct AudioPlayer {
    current_stop: Arc<Mutex<Option<StopSignal>>>,
}

impl AudioPlayer {
    pub fn stop(&self) {
        let mut current = self
            .current_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(signal) = current.take() {
            signal.raise();
        }
    }

    /// Registers a new clip before its audio is fetched, so a stop issued
    /// while downloading still applies to it.
    pub fn begin(&self) -> StopSignal {
        let signal = StopSignal::default();
        let mut current = self
            .current_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.replace(signal.clone()) {
            previous.raise();
        }
        signal
    }

    /// Resolves once the clip ends or `signal` is raised.
    pub async fn play(&self, bytes: Vec<u8>, signal: StopSignal) -> Result<()> {
        if signal.is_stopped() {
            return Ok(());
        }

        tokio::task::spawn_blocking(move || -> Result<()> {
            // OutputStream is !Send, so it lives and dies on this blocking thread.
            let (_stream, handle) =
                rodio::OutputStream::try_default().context("no audio output device available")?;
            let sink = rodio::Sink::try_new(&handle).context("failed to open audio output")?;
            let source =
                rodio::Decoder::new(Cursor::new(bytes)).context("failed to decode audio")?;
            sink.append(source);

            while !sink.empty() {
                if signal.is_stopped() {
                    sink.stop();
                    break;
                }
                std::thread::sleep(STOP_POLL_INTERVAL);
            }
            Ok(())
        })
        .await
        .context("playback task panicked")?
    }
}

#[cfg(test)]
#[path = "tests/playback_tests.rs"]
mod tests;
