//! PTZ motion engine
//!
//! Position advances on a background tick loop while a move is in
//! progress. Exactly one loop runs at a time: starting a new move cancels
//! the previous loop and waits for it to exit before touching state, so
//! two moves can never fight over position.
//!
//! With a command link attached the engine stops simulating pan/tilt/zoom
//! itself: moves are published to the link, the loop only tracks motion
//! state, and position honors whatever the feedback channel reports back.

use ptz_link::{FeedbackReceiver, LinkSender, PtzDatagram};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fraction of the commanded velocity applied per tick.
pub const TICK_GAIN: f32 = 0.1;

/// Simulation tick period.
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

pub const PAN_RANGE: (f32, f32) = (-1.0, 1.0);
pub const TILT_RANGE: (f32, f32) = (-1.0, 1.0);
pub const ZOOM_RANGE: (f32, f32) = (0.0, 1.0);

/// Camera orientation. Pan/tilt are normalized to `[-1, 1]`, zoom to
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PtzPosition {
    pub pan: f32,
    pub tilt: f32,
    pub zoom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PtzVelocity {
    pan: f32,
    tilt: f32,
    zoom: f32,
}

/// Position snapshot plus whether a motion loop is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtzStatus {
    pub position: PtzPosition,
    pub moving: bool,
}

#[derive(Debug, Default)]
struct PtzData {
    position: PtzPosition,
    velocity: PtzVelocity,
    moving: bool,
}

struct MotionLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct PtzEngine {
    data: Arc<Mutex<PtzData>>,
    /// Serializes loop starts and stops; held across the join so a new
    /// loop can only start after the old one has fully exited.
    motion: Mutex<Option<MotionLoop>>,
    live_loops: Arc<AtomicU32>,
    tick: Duration,
    link: Option<LinkSender>,
}

impl PtzEngine {
    /// Simulation engine with the standard tick period.
    pub fn new() -> Self {
        Self::with_tick(TICK_PERIOD)
    }

    /// Simulation engine with a custom tick period.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            data: Arc::new(Mutex::new(PtzData::default())),
            motion: Mutex::new(None),
            live_loops: Arc::new(AtomicU32::new(0)),
            tick,
            link: None,
        }
    }

    /// Engine that forwards moves over a command link instead of
    /// simulating them. Position then follows the feedback channel.
    pub fn with_link(link: LinkSender) -> Self {
        let mut engine = Self::new();
        engine.link = Some(link);
        engine
    }

    fn forwarding(&self) -> bool {
        self.link.is_some()
    }

    /// Number of motion loops currently alive; 0 or 1 at all times.
    pub fn live_motion_loops(&self) -> u32 {
        self.live_loops.load(Ordering::SeqCst)
    }

    /// Jump directly to a position. Stops any running loop first; axes
    /// the request leaves out keep their current value, the rest are
    /// clamped into range.
    pub async fn absolute_move(&self, pan: Option<f32>, tilt: Option<f32>, zoom: Option<f32>) {
        let mut slot = self.motion.lock().await;
        stop_loop(&mut slot).await;

        {
            let mut data = self.data.lock().await;
            if let Some(pan) = pan {
                data.position.pan = clamp_axis(pan, PAN_RANGE);
            }
            if let Some(tilt) = tilt {
                data.position.tilt = clamp_axis(tilt, TILT_RANGE);
            }
            if let Some(zoom) = zoom {
                data.position.zoom = clamp_axis(zoom, ZOOM_RANGE);
            }
            data.moving = false;
        }
        drop(slot);

        if let Some(link) = &self.link {
            link.publish(&PtzDatagram { pan, tilt, zoom }).await;
        }
    }

    /// Start moving at the given velocity. Replaces any running loop;
    /// axes the request leaves out keep their current velocity.
    pub async fn continuous_move(&self, pan: Option<f32>, tilt: Option<f32>, zoom: Option<f32>) {
        let mut slot = self.motion.lock().await;
        stop_loop(&mut slot).await;

        {
            let mut data = self.data.lock().await;
            if let Some(pan) = pan {
                data.velocity.pan = pan;
            }
            if let Some(tilt) = tilt {
                data.velocity.tilt = tilt;
            }
            if let Some(zoom) = zoom {
                data.velocity.zoom = zoom;
            }
            data.moving = true;
        }

        let cancel = CancellationToken::new();
        self.live_loops.fetch_add(1, Ordering::SeqCst);
        let handle = tokio::spawn(run_motion(
            Arc::clone(&self.data),
            Arc::clone(&self.live_loops),
            cancel.clone(),
            self.tick,
            self.forwarding(),
        ));
        *slot = Some(MotionLoop { cancel, handle });
        drop(slot);

        if let Some(link) = &self.link {
            link.publish(&PtzDatagram { pan, tilt, zoom }).await;
        }
    }

    /// Halt motion: cancel the loop, wait for it to exit, zero velocity.
    pub async fn stop(&self) {
        let mut slot = self.motion.lock().await;
        stop_loop(&mut slot).await;

        let mut data = self.data.lock().await;
        data.velocity = PtzVelocity::default();
        data.moving = false;
    }

    /// Position and motion flag from a single lock acquisition.
    pub async fn status(&self) -> PtzStatus {
        let data = self.data.lock().await;
        PtzStatus {
            position: data.position,
            moving: data.moving,
        }
    }

    /// Overwrite position from a feedback report. Axes the report leaves
    /// out keep their last known value; reported values are clamped.
    pub async fn apply_feedback(&self, report: &PtzDatagram) {
        let mut data = self.data.lock().await;
        if let Some(pan) = report.pan {
            data.position.pan = clamp_axis(pan, PAN_RANGE);
        }
        if let Some(tilt) = report.tilt {
            data.position.tilt = clamp_axis(tilt, TILT_RANGE);
        }
        if let Some(zoom) = report.zoom {
            data.position.zoom = clamp_axis(zoom, ZOOM_RANGE);
        }
    }
}

impl Default for PtzEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancel the loop in the slot, if any, and wait for it to finish.
async fn stop_loop(slot: &mut Option<MotionLoop>) {
    if let Some(motion) = slot.take() {
        motion.cancel.cancel();
        let _ = motion.handle.await;
    }
}

/// Advance one axis by one tick of velocity, clamped to its range.
pub fn step_axis(position: f32, velocity: f32, range: (f32, f32)) -> f32 {
    clamp_axis(position + velocity * TICK_GAIN, range)
}

fn clamp_axis(value: f32, (min, max): (f32, f32)) -> f32 {
    value.clamp(min, max)
}

async fn run_motion(
    data: Arc<Mutex<PtzData>>,
    live_loops: Arc<AtomicU32>,
    cancel: CancellationToken,
    tick: Duration,
    forwarding: bool,
) {
    let mut ticker = tokio::time::interval(tick);
    // The first interval tick completes immediately; skip it so position
    // starts advancing one full period after the command.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if forwarding {
                    continue;
                }
                let mut data = data.lock().await;
                let velocity = data.velocity;
                data.position.pan = step_axis(data.position.pan, velocity.pan, PAN_RANGE);
                data.position.tilt = step_axis(data.position.tilt, velocity.tilt, TILT_RANGE);
                data.position.zoom = step_axis(data.position.zoom, velocity.zoom, ZOOM_RANGE);
            }
        }
    }

    let mut data = data.lock().await;
    data.velocity = PtzVelocity::default();
    data.moving = false;
    drop(data);
    live_loops.fetch_sub(1, Ordering::SeqCst);
}

/// Spawn the feedback listener: position reports from the link overwrite
/// the engine's position until cancelled.
pub fn spawn_feedback(
    engine: Arc<PtzEngine>,
    receiver: FeedbackReceiver,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("PTZ feedback listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                report = receiver.recv() => match report {
                    Ok(report) => engine.apply_feedback(&report).await,
                    Err(e) => {
                        tracing::warn!("dropping unreadable PTZ feedback: {}", e);
                    }
                },
            }
        }
        tracing::info!("PTZ feedback listener stopped");
    })
}
