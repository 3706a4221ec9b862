/// Core sequencer logic - pixel grid state and editing session
/// Columns are steps across the loop; every lit cell in a column triggers its instrument
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod instrument;
pub mod playback;

use instrument::{Instrument, Rgb, EMPTY_RGB};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Option<Instrument>>,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![None; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Instrument> {
        self.offset(x, y).and_then(|i| self.cells[i])
    }

    pub fn set(&mut self, x: usize, y: usize, value: Option<Instrument>) {
        if let Some(i) = self.offset(x, y) {
            self.cells[i] = value;
        }
    }

    pub fn paint(&mut self, x: usize, y: usize, instrument: Instrument) {
        self.set(x, y, Some(instrument));
    }

    pub fn erase(&mut self, x: usize, y: usize) {
        self.set(x, y, None);
    }

    pub fn rgb(&self, x: usize, y: usize) -> Rgb {
        self.get(x, y).map_or(EMPTY_RGB, Instrument::rgb)
    }

    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: Rgb) {
        self.set(x, y, Instrument::from_rgb(rgb));
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Lit instruments of one step, top to bottom
    pub fn column(&self, x: usize) -> impl Iterator<Item = Instrument> + '_ {
        (0..self.height).filter_map(move |y| self.get(x, y))
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lit_count() == 0
    }

    /// Scatter random edits: half repaint a cell with a random instrument,
    /// half copy the cell mirrored across the diagonal
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.cells.is_empty() {
            return;
        }
        let iterations = self.width * self.height / 10;
        for _ in 0..iterations {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            if rng.gen_bool(0.5) {
                let inst = Instrument::ALL[rng.gen_range(0..Instrument::ALL.len())];
                self.paint(x, y, inst);
            } else {
                let mirrored = self.get(y % self.width, x % self.height);
                self.set(x, y, mirrored);
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::config::GRID_SIZE, crate::config::GRID_SIZE)
    }
}

/// Editing session: the grid being drawn, the selected color and the transport
pub struct Sequencer {
    grid: Grid,
    grid_state: Arc<Mutex<Grid>>,
    selected: Instrument,
    loop_duration: Duration,
    started_at: Option<Instant>,
}

impl Sequencer {
    pub fn new(grid: Grid, loop_duration: Duration) -> Self {
        let grid_state = Arc::new(Mutex::new(grid.clone()));
        Self {
            grid,
            grid_state,
            selected: Instrument::Kick,
            loop_duration,
            started_at: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Snapshot shared with the playback thread
    pub fn grid_state(&self) -> &Arc<Mutex<Grid>> {
        &self.grid_state
    }

    pub fn selected(&self) -> Instrument {
        self.selected
    }

    pub fn select(&mut self, instrument: Instrument) {
        self.selected = instrument;
    }

    /// Returns false when the key is not an instrument shortcut
    pub fn select_key(&mut self, key: char) -> bool {
        match Instrument::from_key(key) {
            Some(inst) => {
                self.selected = inst;
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        self.selected = self.selected.next();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.previous();
    }

    pub fn paint(&mut self, x: usize, y: usize) {
        self.grid.paint(x, y, self.selected);
        self.update_grid_state();
    }

    pub fn erase(&mut self, x: usize, y: usize) {
        self.grid.erase(x, y);
        self.update_grid_state();
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.update_grid_state();
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.grid.mutate(rng);
        debug!(lit = self.grid.lit_count(), "grid mutated");
        self.update_grid_state();
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            info!("playback started");
            self.started_at = Some(now);
        }
    }

    pub fn stop(&mut self) {
        if self.started_at.take().is_some() {
            info!("playback stopped");
        }
    }

    pub fn toggle_play(&mut self, now: Instant) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Column under the playhead, `None` while stopped
    pub fn playhead_column(&self, now: Instant) -> Option<usize> {
        let started = self.started_at?;
        Some(playhead_column(
            now.saturating_duration_since(started),
            self.loop_duration,
            self.grid.width(),
        ))
    }

    pub fn update_grid_state(&mut self) {
        *lock_grid(&self.grid_state) = self.grid.clone();
    }
}

/// Map elapsed time onto a column of a looping grid
pub fn playhead_column(elapsed: Duration, loop_duration: Duration, width: usize) -> usize {
    if width == 0 || loop_duration.is_zero() {
        return 0;
    }
    let loop_nanos = loop_duration.as_nanos();
    let within = elapsed.as_nanos() % loop_nanos;
    let column = (within * width as u128 / loop_nanos) as usize;
    column.min(width - 1)
}

/// Lock the shared grid, recovering the data if a holder panicked
pub(crate) fn lock_grid(state: &Mutex<Grid>) -> MutexGuard<'_, Grid> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::default();
        assert_eq!(grid.width(), 64);
        assert_eq!(grid.height(), 64);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_grid_paint_and_erase() {
        let mut grid = Grid::new(4, 4);
        grid.paint(1, 2, Instrument::Bass);
        assert_eq!(grid.get(1, 2), Some(Instrument::Bass));
        assert_eq!(grid.rgb(1, 2), Instrument::Bass.rgb());
        grid.erase(1, 2);
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.rgb(1, 2), EMPTY_RGB);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut grid = Grid::new(4, 4);
        grid.paint(4, 0, Instrument::Kick);
        grid.paint(0, 4, Instrument::Kick);
        assert!(grid.is_empty());
        assert_eq!(grid.get(10, 10), None);
    }

    #[test]
    fn test_set_rgb_unknown_color_is_empty() {
        let mut grid = Grid::new(2, 2);
        grid.set_rgb(0, 0, Instrument::Lead.rgb());
        grid.set_rgb(1, 1, [12, 34, 56]);
        assert_eq!(grid.get(0, 0), Some(Instrument::Lead));
        assert_eq!(grid.get(1, 1), None);
    }

    #[test]
    fn test_column() {
        let mut grid = Grid::new(3, 3);
        grid.paint(1, 0, Instrument::Kick);
        grid.paint(1, 2, Instrument::Snare);
        grid.paint(2, 1, Instrument::Lead);
        let column: Vec<_> = grid.column(1).collect();
        assert_eq!(column, vec![Instrument::Kick, Instrument::Snare]);
        assert_eq!(grid.column(0).count(), 0);
        assert_eq!(grid.lit_count(), 3);
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::new(3, 3);
        grid.paint(0, 0, Instrument::Kick);
        grid.clear();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_mutate_is_seeded() {
        let mut a = Grid::default();
        let mut b = Grid::default();
        a.mutate(&mut StdRng::seed_from_u64(9));
        b.mutate(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.lit_count() <= 64 * 64 / 10);
    }

    #[test]
    fn test_mutate_non_square_grid() {
        let mut grid = Grid::new(16, 3);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            grid.mutate(&mut rng);
        }
        assert_eq!(grid.width(), 16);
    }

    #[test]
    fn test_sequencer_paint_updates_shared_state() {
        let mut seq = Sequencer::new(Grid::new(8, 8), Duration::from_secs(4));
        seq.select(Instrument::Snare);
        seq.paint(3, 3);
        assert_eq!(lock_grid(seq.grid_state()).get(3, 3), Some(Instrument::Snare));
        seq.erase(3, 3);
        assert_eq!(lock_grid(seq.grid_state()).get(3, 3), None);
    }

    #[test]
    fn test_sequencer_selection() {
        let mut seq = Sequencer::new(Grid::new(8, 8), Duration::from_secs(4));
        assert_eq!(seq.selected(), Instrument::Kick);
        seq.select_previous();
        assert_eq!(seq.selected(), Instrument::Lead);
        seq.select_next();
        seq.select_next();
        assert_eq!(seq.selected(), Instrument::Snare);
        assert!(seq.select_key('4'));
        assert_eq!(seq.selected(), Instrument::Bass);
        assert!(!seq.select_key('9'));
        assert_eq!(seq.selected(), Instrument::Bass);
    }

    #[test]
    fn test_playhead_column() {
        let loop_len = Duration::from_secs(4);
        assert_eq!(playhead_column(Duration::ZERO, loop_len, 64), 0);
        assert_eq!(playhead_column(Duration::from_millis(62), loop_len, 64), 0);
        assert_eq!(playhead_column(Duration::from_millis(63), loop_len, 64), 1);
        assert_eq!(playhead_column(Duration::from_millis(3999), loop_len, 64), 63);
        assert_eq!(playhead_column(Duration::from_secs(4), loop_len, 64), 0);
        assert_eq!(playhead_column(Duration::from_secs(6), loop_len, 64), 32);
    }

    #[test]
    fn test_sequencer_transport() {
        let mut seq = Sequencer::new(Grid::default(), Duration::from_secs(4));
        let t0 = Instant::now();
        assert_eq!(seq.playhead_column(t0), None);
        seq.toggle_play(t0);
        assert!(seq.is_playing());
        assert_eq!(seq.playhead_column(t0 + Duration::from_secs(2)), Some(32));
        seq.toggle_play(t0);
        assert!(!seq.is_playing());
        assert_eq!(seq.playhead_column(t0 + Duration::from_secs(2)), None);
    }
}
