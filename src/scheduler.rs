//! Phase table, per-phase parameter presets and the sequential phase state machine.
//!
//! Time never comes from a global clock here: every call takes the `now`
//! instant from the caller, which keeps the machine deterministic under test.

use std::time::{Duration, Instant};

use tracing::info;

pub const PHASE_COUNT: usize = 6;

/// Duration of each phase in milliseconds, indexed by phase.
pub const PHASE_DURATIONS_MS: [u64; PHASE_COUNT] = [10_000, 15_000, 20_000, 25_000, 30_000, 35_000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Melt,
    ZoomLag,
    RotatingDuplicates,
    StaticNoise,
    Pixelate,
    RedSquareMarkers,
}

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] = [
        Phase::Melt,
        Phase::ZoomLag,
        Phase::RotatingDuplicates,
        Phase::StaticNoise,
        Phase::Pixelate,
        Phase::RedSquareMarkers,
    ];

    pub fn from_index(index: usize) -> Option<Phase> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(PHASE_DURATIONS_MS[self.index()])
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Melt => "melt",
            Phase::ZoomLag => "zoom-lag",
            Phase::RotatingDuplicates => "rotating-duplicates",
            Phase::StaticNoise => "static-noise",
            Phase::Pixelate => "pixelate",
            Phase::RedSquareMarkers => "red-square-markers",
        }
    }

    /// Parameter changes applied on entry. `None` keeps the previous value.
    pub fn preset(self) -> PhasePreset {
        let p = |column_width, max_drop_speed, duplicate_count| PhasePreset {
            column_width,
            max_drop_speed,
            duplicate_count,
        };
        match self {
            Phase::Melt => p(Some(4), Some(18), None),
            Phase::ZoomLag => p(Some(3), Some(8), None),
            Phase::RotatingDuplicates => p(Some(4), None, Some(28)),
            Phase::StaticNoise => p(Some(2), Some(4), None),
            Phase::Pixelate => p(Some(6), None, None),
            Phase::RedSquareMarkers => p(None, None, None),
        }
    }

    /// Whether entering this phase seeds a fresh marker set.
    pub fn spawns_markers(self) -> bool {
        self == Phase::RedSquareMarkers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePreset {
    pub column_width: Option<usize>,
    pub max_drop_speed: Option<i32>,
    pub duplicate_count: Option<usize>,
}

/// Phase-scoped tunables that survive until a preset overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseParams {
    pub column_width: usize,
    pub max_drop_speed: i32,
    pub duplicate_count: usize,
}

impl Default for PhaseParams {
    fn default() -> Self {
        Self {
            column_width: 4,
            max_drop_speed: 18,
            duplicate_count: 28,
        }
    }
}

impl PhaseParams {
    pub fn apply(&mut self, preset: PhasePreset) {
        if let Some(w) = preset.column_width {
            self.column_width = w.max(1);
        }
        if let Some(s) = preset.max_drop_speed {
            self.max_drop_speed = s;
        }
        if let Some(n) = preset.duplicate_count {
            self.duplicate_count = n;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseState {
    pub phase: Phase,
    pub started_at: Instant,
    pub duration: Duration,
}

impl PhaseState {
    /// Elapsed fraction of the phase, clamped to [0, 1].
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        let total = self.duration.as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        (elapsed.as_secs_f64() / total).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running(PhaseState),
    Finished,
}

/// Result of asking the scheduler to move to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A phase was (re)entered; dependent state must be re-initialized.
    Entered(Phase),
    /// The sequence just ran out of phases. Reported exactly once.
    Finished,
    /// The sequence had already finished; nothing happened.
    AlreadyFinished,
}

#[derive(Debug)]
pub struct PhaseScheduler {
    state: State,
    params: PhaseParams,
    paused_at: Option<Instant>,
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            params: PhaseParams::default(),
            paused_at: None,
        }
    }

    pub fn params(&self) -> PhaseParams {
        self.params
    }

    pub fn current(&self) -> Option<PhaseState> {
        match self.state {
            State::Running(s) => Some(s),
            _ => None,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        self.current().map(|s| s.phase)
    }

    /// Index of the active phase; before the first start this is 0.
    pub fn index(&self) -> usize {
        match self.state {
            State::Idle => 0,
            State::Running(s) => s.phase.index(),
            State::Finished => PHASE_COUNT,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Progress of the active phase. While paused, progress is frozen at the
    /// instant the pause began; after the sequence ends it is 1.
    pub fn progress(&self, now: Instant) -> f32 {
        match self.state {
            State::Idle => 0.0,
            State::Finished => 1.0,
            State::Running(s) => s.progress(self.paused_at.unwrap_or(now)),
        }
    }

    /// Enter phase `index`, or finish when it is past the last phase.
    pub fn start_phase(&mut self, index: usize, now: Instant) -> Transition {
        if self.is_finished() {
            return Transition::AlreadyFinished;
        }
        let Some(phase) = Phase::from_index(index) else {
            info!("phase sequence complete");
            self.state = State::Finished;
            self.paused_at = None;
            return Transition::Finished;
        };
        self.params.apply(phase.preset());
        self.state = State::Running(PhaseState {
            phase,
            started_at: now,
            duration: phase.duration(),
        });
        info!(index, phase = phase.name(), "phase started");
        Transition::Entered(phase)
    }

    /// Advance when the active phase has run its full duration.
    /// Paused schedulers never advance.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        if self.is_paused() {
            return None;
        }
        let state = self.current()?;
        if state.progress(now) >= 1.0 {
            Some(self.start_phase(state.phase.index() + 1, now))
        } else {
            None
        }
    }

    /// Move to the next phase regardless of progress.
    pub fn skip(&mut self, now: Instant) -> Transition {
        self.start_phase(self.index() + 1, now)
    }

    /// Freeze or resume. The phase start timestamp is left untouched, so a
    /// long pause lets the phase expire on the first tick after resuming.
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        self.paused_at = match self.paused_at {
            Some(_) => None,
            None => Some(now),
        };
        info!(paused = self.is_paused(), "pause toggled");
        self.is_paused()
    }
}
