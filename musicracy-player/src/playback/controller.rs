//! Timer-driven playback controller
//!
//! One task owns all playback-timing state and drains a FIFO inbox one event
//! at a time, so no two transitions ever interleave. Producers (request
//! handlers, the auto-advance timer, the first-vote bootstrap) only post into
//! the inbox.
//!
//! Starting fresh, the timer is armed for the track length minus the preload
//! window. When it fires, the controller stages the next track on the device
//! while the current one is still audible, then re-arms for the full length of
//! the newly staged track.

use super::state::{ControllerStatus, PlaybackEvent, PlaybackState};
use super::timer::OneShotTimer;
use super::vote_queue::VoteRankedQueue;
use crate::backend::PlaybackBackend;
use crate::error::{Error, Result};
use musicracy_common::Track;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Share of a short track's length kept as a buffer before auto-advance
const SHORT_TRACK_BUFFER: f64 = 0.05;

struct Command {
    event: PlaybackEvent,
    /// Sequence number of the timer that produced a `TimerFired`
    timer_seq: Option<u64>,
    reply: Option<oneshot::Sender<Result<()>>>,
}

/// Cloneable handle for posting events and reading controller status
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<ControllerStatus>,
}

impl ControllerHandle {
    pub async fn initialize(&self) -> Result<()> {
        self.request(PlaybackEvent::Initialize).await
    }

    pub async fn play(&self) -> Result<()> {
        self.request(PlaybackEvent::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(PlaybackEvent::Pause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.request(PlaybackEvent::Stop).await
    }

    pub async fn finish(&self) -> Result<()> {
        self.request(PlaybackEvent::Finish).await
    }

    /// Post `event` and wait until the controller has processed it
    pub async fn request(&self, event: PlaybackEvent) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(event, Some(reply_tx))?;
        reply_rx.await.map_err(|_| Error::ControllerFinished)?
    }

    /// Post `event` without waiting for it; failures are only logged
    pub fn post(&self, event: PlaybackEvent) -> Result<()> {
        self.send(event, None)
    }

    fn send(&self, event: PlaybackEvent, reply: Option<oneshot::Sender<Result<()>>>) -> Result<()> {
        self.tx
            .send(Command {
                event,
                timer_seq: None,
                reply,
            })
            .map_err(|_| Error::ControllerFinished)
    }

    /// Latest published status
    pub fn status(&self) -> ControllerStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerStatus> {
        self.status_rx.clone()
    }

    /// Finish has been processed (or the controller task is gone)
    pub fn is_finished(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Playback state machine; runs on its own task
pub struct PlaybackController {
    queue: Arc<VoteRankedQueue>,
    backend: Arc<dyn PlaybackBackend>,
    preload_window: Duration,

    state: PlaybackState,
    remaining: Option<Duration>,
    last_transition: Option<Instant>,
    last_event: Option<PlaybackEvent>,
    current_track: Option<Track>,

    timer: Option<OneShotTimer>,
    timer_seq: u64,
    inbox: mpsc::WeakUnboundedSender<Command>,
    status_tx: watch::Sender<ControllerStatus>,
}

impl PlaybackController {
    /// Spawn the controller loop, starting in `Stopped`
    pub fn spawn(
        queue: Arc<VoteRankedQueue>,
        backend: Arc<dyn PlaybackBackend>,
        preload_window: Duration,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ControllerStatus::default());

        let controller = Self {
            queue,
            backend,
            preload_window,
            state: PlaybackState::Stopped,
            remaining: None,
            last_transition: None,
            last_event: None,
            current_track: None,
            timer: None,
            timer_seq: 0,
            inbox: tx.downgrade(),
            status_tx,
        };

        info!(
            "Starting playback controller (backend: {}, preload window: {:.1}s)",
            controller.backend.name(),
            preload_window.as_secs_f64()
        );
        let join = tokio::spawn(controller.run(rx));

        (ControllerHandle { tx, status_rx }, join)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            let Command {
                event,
                timer_seq,
                reply,
            } = command;
            debug!("Dispatching {} (state: {})", event, self.state);

            let result = self.dispatch(event, timer_seq).await;
            self.publish_status();

            match reply {
                Some(reply) => {
                    let _ = reply.send(result);
                }
                None => {
                    if let Err(e) = result {
                        error!("Failed to handle {}: {}", event, e);
                    }
                }
            }

            if event == PlaybackEvent::Finish {
                break;
            }
        }

        // Reject anything that was posted behind Finish
        rx.close();
        while let Ok(late) = rx.try_recv() {
            debug!("Rejecting {} posted after finish", late.event);
            if let Some(reply) = late.reply {
                let _ = reply.send(Err(Error::ControllerFinished));
            }
        }
        self.cancel_timer();
        info!("Playback controller stopped");
    }

    async fn dispatch(&mut self, event: PlaybackEvent, timer_seq: Option<u64>) -> Result<()> {
        self.last_event = Some(event);
        match event {
            PlaybackEvent::Initialize => self.handle_initialize().await,
            PlaybackEvent::Play => self.handle_play().await,
            PlaybackEvent::Pause => self.handle_pause().await,
            PlaybackEvent::Stop => self.handle_stop().await,
            PlaybackEvent::TimerFired => self.handle_timer_fired(timer_seq).await,
            PlaybackEvent::Finish => {
                self.handle_finish();
                Ok(())
            }
        }
    }

    async fn handle_play(&mut self) -> Result<()> {
        let previous = self.state;
        let staged_remaining = if previous == PlaybackState::Stopped {
            let track = self.stage_next().await?;
            Some(self.first_budget(&track))
        } else if self.last_event == Some(PlaybackEvent::TimerFired) {
            let track = self.stage_next().await?;
            Some(track.length())
        } else if previous == PlaybackState::Running {
            debug!("Already running, ignoring play");
            return Ok(());
        } else {
            None
        };
        let remaining = staged_remaining.or(self.remaining).unwrap_or_default();
        info!("Remaining in secs: {:.1}", remaining.as_secs_f64());

        let bootstrap = self.last_event == Some(PlaybackEvent::Initialize);
        if matches!(previous, PlaybackState::Paused | PlaybackState::Stopped) && !bootstrap {
            self.backend.play().await?;
        }

        self.arm_timer(remaining);
        self.remaining = Some(remaining);
        self.last_transition = Some(Instant::now());
        self.state = PlaybackState::Running;
        Ok(())
    }

    async fn handle_initialize(&mut self) -> Result<()> {
        if self.state != PlaybackState::Stopped {
            debug!("Initialize ignored in state {}", self.state);
            return Ok(());
        }

        let init = self.backend.initialize().await?;
        if init.playing {
            info!("Device already playing, taking over");
            return self.handle_play().await;
        }

        // Stage the first track and wait for the user to press play
        let track = self.stage_next().await?;
        self.remaining = Some(self.first_budget(&track));
        self.last_transition = Some(Instant::now());
        self.state = PlaybackState::Paused;
        Ok(())
    }

    async fn handle_pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Running {
            debug!("Pause ignored in state {}", self.state);
            return Ok(());
        }

        self.backend.pause().await?;

        let now = Instant::now();
        let elapsed = self
            .last_transition
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        let remaining = self.remaining.unwrap_or_default().saturating_sub(elapsed);
        info!("Paused with {:.1}s remaining", remaining.as_secs_f64());

        self.remaining = Some(remaining);
        self.last_transition = Some(now);
        self.cancel_timer();
        self.state = PlaybackState::Paused;
        Ok(())
    }

    async fn handle_stop(&mut self) -> Result<()> {
        if self.state != PlaybackState::Running {
            debug!("Stop ignored in state {}", self.state);
            return Ok(());
        }

        self.backend.stop().await?;

        self.remaining = None;
        self.last_transition = None;
        self.cancel_timer();
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    async fn handle_timer_fired(&mut self, timer_seq: Option<u64>) -> Result<()> {
        if self.state != PlaybackState::Running {
            debug!("Stale timer in state {}, stopping", self.state);
            self.remaining = None;
            self.last_transition = None;
            self.state = PlaybackState::Stopped;
            return Ok(());
        }

        // A timer cancelled by Pause can still be queued behind a later Play
        if let Some(seq) = timer_seq {
            if seq != self.timer_seq {
                debug!("Ignoring superseded timer #{} (armed: #{})", seq, self.timer_seq);
                return Ok(());
            }
        }

        // Nothing staged to follow: stop so the next Play starts fresh
        if let Err(e) = self.handle_play().await {
            self.cancel_timer();
            self.remaining = None;
            self.last_transition = None;
            self.state = PlaybackState::Stopped;
            return Err(e);
        }
        Ok(())
    }

    fn handle_finish(&mut self) {
        if self.timer.as_ref().is_some_and(OneShotTimer::is_armed) {
            self.remaining = Some(Duration::ZERO);
        }
        self.cancel_timer();
        info!("Finishing playback session");
    }

    /// Pop the next track and pre-stage it on the device
    async fn stage_next(&mut self) -> Result<Track> {
        let track = self.queue.pop_next().await?;
        self.backend.enqueue(&track.id).await?;
        info!("Now playing: {}", track);
        self.current_track = Some(track.clone());
        Ok(track)
    }

    /// Auto-advance budget for a track started from scratch
    fn first_budget(&self, track: &Track) -> Duration {
        let length = track.length();
        if length > self.preload_window {
            length - self.preload_window
        } else {
            length - length.mul_f64(SHORT_TRACK_BUFFER)
        }
    }

    fn arm_timer(&mut self, delay: Duration) {
        self.cancel_timer();
        self.timer_seq += 1;
        let command = Command {
            event: PlaybackEvent::TimerFired,
            timer_seq: Some(self.timer_seq),
            reply: None,
        };
        self.timer = Some(OneShotTimer::arm(delay, self.inbox.clone(), command));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn publish_status(&self) {
        let status = ControllerStatus {
            state: self.state,
            remaining: self.remaining,
            current_track: self.current_track.clone(),
            timer_deadline: self
                .timer
                .as_ref()
                .filter(|t| t.is_armed())
                .map(OneShotTimer::deadline),
            finished: self.last_event == Some(PlaybackEvent::Finish),
        };
        self.status_tx.send_replace(status);
    }
}
