/// Playback engine - walks the grid columns in real time and reports triggers
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::instrument::Instrument;
use super::{lock_grid, Grid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StepAdvanced(usize),
    Trigger { column: usize, instrument: Instrument },
    NoteOff(Instrument),
}

pub struct PlaybackEngine {
    sender: Sender<PlaybackEvent>,
    receiver: Receiver<PlaybackEvent>,
    is_running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            sender,
            receiver,
            is_running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn start(&mut self, step_duration: Duration, grid_state: Arc<Mutex<Grid>>) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(step_ms = step_duration.as_secs_f64() * 1000.0, "playback engine started");

        let is_running = Arc::clone(&self.is_running);
        let sender = self.sender.clone();

        self.worker = Some(thread::spawn(move || {
            let note_duration = step_duration / 2;
            let mut current_step = 0;
            let started = Instant::now();
            let mut steps_elapsed: u32 = 0;

            while is_running.load(Ordering::SeqCst) {
                let now = Instant::now();

                if now >= step_deadline(started, steps_elapsed, step_duration) {
                    let _ = sender.send(PlaybackEvent::StepAdvanced(current_step));

                    // One trigger per instrument, however many rows light it
                    let (triggered, width) = {
                        let grid = lock_grid(&grid_state);
                        let mut seen = [false; Instrument::ALL.len()];
                        for inst in grid.column(current_step) {
                            seen[inst.index()] = true;
                        }
                        (seen, grid.width())
                    };

                    for inst in Instrument::ALL.into_iter().filter(|i| triggered[i.index()]) {
                        debug!(column = current_step, instrument = %inst, "trigger");
                        let _ = sender.send(PlaybackEvent::Trigger {
                            column: current_step,
                            instrument: inst,
                        });

                        let sender_clone = sender.clone();
                        thread::spawn(move || {
                            thread::sleep(note_duration);
                            let _ = sender_clone.send(PlaybackEvent::NoteOff(inst));
                        });
                    }

                    current_step = if width == 0 { 0 } else { (current_step + 1) % width };
                    steps_elapsed += 1;
                }

                thread::sleep(Duration::from_millis(1));
            }
        }));
    }

    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("playback engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Deadlines are offsets from the start instant so late wakeups never shift later steps
pub fn step_deadline(started: Instant, step: u32, step_duration: Duration) -> Instant {
    started + step_duration * step
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
