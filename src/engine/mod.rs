//! The frame-loop driver: owns a rig, persistent per-fixture state, and a
//! transport handle, and renders a [`Clip`] at a configured frame rate.

pub mod transport;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};

use crate::blend::merge_deltas;
use crate::clip::Clip;
use crate::config::{EngineConfig, Protocol};
use crate::error::EngineError;
use crate::model::{FixtureId, FixtureState, Rig};

use transport::{ArtNetTransport, SacnTransport, Transport};

#[derive(Default)]
struct PlaybackState {
    finished: bool,
    error: Option<EngineError>,
}

struct Playback {
    running: Arc<AtomicBool>,
    state: Arc<(Mutex<PlaybackState>, Condvar)>,
    thread: Option<thread::JoinHandle<()>>,
}

/// Plays [`Clip`]s against a [`Rig`] at a configured frame rate, emitting
/// per-universe DMX bytes through a protocol transport.
pub struct Engine {
    rig: Option<Arc<Rig>>,
    fps: f64,
    protocol: Protocol,
    universe_ips: HashMap<u32, String>,
    artnet_target: String,
    playback: Option<Playback>,
}

impl Engine {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rig: None,
            fps: config.fps,
            protocol: config.protocol,
            universe_ips: config.universe_ips.clone(),
            artnet_target: config.artnet_target.clone(),
            playback: None,
        }
    }

    /// Replace the rig. Resets per-fixture state implicitly: the next
    /// `play`/`render_frame` call starts from empty state.
    pub fn set_rig(&mut self, rig: Rig) {
        self.rig = Some(Arc::new(rig));
    }

    fn universes(&self) -> Vec<u32> {
        self.rig.as_ref().map(|r| r.universes()).filter(|u| !u.is_empty()).unwrap_or_else(|| vec![1])
    }

    fn create_transport(&self) -> Box<dyn Transport> {
        let universes = self.universes();
        match self.protocol {
            Protocol::Sacn => Box::new(SacnTransport::new(universes, self.universe_ips.clone())),
            Protocol::ArtNet => {
                Box::new(ArtNetTransport::new(universes, self.universe_ips.clone(), self.artnet_target.clone()))
            }
        }
    }

    /// Render `clip` once at time `t` without touching a transport.
    /// Deterministic; intended for tests and offline preview.
    pub fn render_frame(&self, clip: &dyn Clip, t: f64) -> Result<HashMap<u32, HashMap<u16, u8>>, EngineError> {
        let Some(rig) = &self.rig else { return Ok(HashMap::new()) };

        let deltas = render_checked(clip, t, rig)?;
        let mut states: HashMap<FixtureId, FixtureState> = HashMap::new();
        for id in rig.all() {
            let state = deltas.get(&id).map_or_else(FixtureState::new, |delta| merge_deltas(&[delta.clone()], None));
            states.insert(id, state);
        }
        Ok(rig.encode_to_dmx(&states))
    }

    /// Start a non-blocking playback session.
    pub fn play(&mut self, clip: Arc<dyn Clip>, start_at: f64) -> Result<(), EngineError> {
        let Some(rig) = self.rig.clone() else {
            return Err(EngineError::configuration("no rig configured"));
        };

        let mut transport = self.create_transport();
        transport.start()?;
        info!("playback started (fps={})", self.fps);

        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new((Mutex::new(PlaybackState::default()), Condvar::new()));
        let frame_duration = Duration::from_secs_f64(1.0 / self.fps);

        let thread_running = Arc::clone(&running);
        let thread_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("dmxcue-frame-loop".into())
            .spawn(move || {
                run_frame_loop(&rig, clip.as_ref(), transport.as_mut(), &thread_running, frame_duration, start_at, &thread_state);
            })
            .map_err(|e| EngineError::transport(e.to_string()))?;

        self.playback = Some(Playback { running, state, thread: Some(handle) });
        Ok(())
    }

    /// Block until the current play finishes or `stop()` is called.
    /// Returns the transport/render error that ended playback, if any.
    pub fn wait(&mut self) -> Result<(), EngineError> {
        let Some(playback) = &mut self.playback else { return Ok(()) };

        {
            let (lock, cvar) = &*playback.state;
            let mut guard = lock.lock();
            while !guard.finished {
                cvar.wait(&mut guard);
            }
        }

        if let Some(thread) = playback.thread.take() {
            let _ = thread.join();
        }

        let error = playback.state.0.lock().error.clone();
        self.playback = None;
        error.map_or(Ok(()), Err)
    }

    /// Signal the frame loop to exit at the next frame boundary.
    pub fn stop(&mut self) {
        if let Some(playback) = &self.playback {
            info!("playback stop requested");
            playback.running.store(false, Ordering::SeqCst);
        }
    }

    /// `play` + `wait`, stopping cleanly on a `Ctrl-C`-style interrupt is
    /// the caller's responsibility (install a signal handler that calls
    /// `stop`); this just sequences the two calls.
    pub fn play_sync(&mut self, clip: Arc<dyn Clip>, start_at: f64) -> Result<(), EngineError> {
        self.play(clip, start_at)?;
        self.wait()
    }
}

fn render_checked(clip: &dyn Clip, t: f64, rig: &Rig) -> Result<HashMap<FixtureId, crate::blend::FixtureDelta>, EngineError> {
    panic::catch_unwind(AssertUnwindSafe(|| clip.render(t, rig)))
        .map_err(|_| EngineError::render("clip render panicked"))
}

#[allow(clippy::too_many_arguments)]
fn run_frame_loop(
    rig: &Rig,
    clip: &dyn Clip,
    transport: &mut dyn Transport,
    running: &AtomicBool,
    frame_duration: Duration,
    start_at: f64,
    state: &(Mutex<PlaybackState>, Condvar),
) {
    let start_instant = Instant::now() - Duration::from_secs_f64(start_at.max(0.0));
    let mut states: HashMap<FixtureId, FixtureState> = rig.all().into_iter().map(|id| (id, FixtureState::new())).collect();
    let mut frame_index: u64 = 0;

    let outcome = loop {
        if !running.load(Ordering::SeqCst) {
            break None;
        }

        let show_time = start_instant.elapsed().as_secs_f64();
        if clip.duration().is_some_and(|d| show_time > d) {
            break None;
        }

        debug!("frame {frame_index}: show_time={show_time:.4}");

        match render_checked(clip, show_time, rig) {
            Ok(deltas) => {
                for id in rig.all() {
                    if let Some(delta) = deltas.get(&id) {
                        let current = states.get(&id).cloned().unwrap_or_default();
                        states.insert(id, merge_deltas(&[delta.clone()], Some(&current)));
                    }
                }
                let universe_data = rig.encode_to_dmx(&states);
                transport.send(&universe_data);
            }
            Err(err) => {
                error!("frame loop aborted: {err}");
                break Some(err);
            }
        }

        frame_index += 1;
        let target = start_instant + frame_duration * u32::try_from(frame_index).unwrap_or(u32::MAX);
        let now = Instant::now();
        if target > now {
            thread::sleep(target - now);
        }
    };

    transport.stop();
    info!("playback stopped");

    let (lock, cvar) = state;
    let mut guard = lock.lock();
    guard.finished = true;
    guard.error = outcome;
    cvar.notify_all();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clip::Scene;
    use crate::model::attribute::{AttrValue, DimmerAttr};
    use crate::model::state::FixtureState as State;
    use crate::model::{FixtureType, Vec3};
    use std::sync::Arc as StdArc;

    fn config() -> EngineConfig {
        EngineConfig { protocol: Protocol::Sacn, fps: 40.0, universe_ips: HashMap::new(), artnet_target: "255.255.255.255".into() }
    }

    #[test]
    fn render_frame_without_rig_is_empty() {
        let engine = Engine::new(&config());
        let mut state = State::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let scene = Scene::single(crate::model::FixtureId::for_test(1), state, Some(1.0), 0.0, 0.0);
        assert!(engine.render_frame(&scene, 0.0).unwrap().is_empty());
    }

    #[test]
    fn render_frame_encodes_configured_rig() {
        let mut engine = Engine::new(&config());
        let ft = StdArc::new(FixtureType::new(vec![Box::new(DimmerAttr::new(false))]));
        let mut rig = Rig::new();
        let fixture = ft.instantiate(1, 1, Vec3::ZERO, Vec::new(), HashMap::new());
        let id = rig.add(fixture).unwrap();
        engine.set_rig(rig);

        let mut state = State::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let scene = Scene::single(id, state, Some(1.0), 0.0, 0.0);

        let universes = engine.render_frame(&scene, 0.0).unwrap();
        assert_eq!(universes[&1][&1], 255);
    }
}
