use shadowboard_core::Scoreboard;
use shadowboard_core::common::{PendingVector, ScoreboardError};
use shadowboard_core::config::Config;
use shadowboard_core::sched::{Snapshot, TickInputs, TickOutputs};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per process.
///
/// Filtering follows `RUST_LOG`; with nothing set only warnings show.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A scoreboard plus the outputs of every tick run through it.
#[derive(Debug)]
pub struct TestContext {
    pub board: Scoreboard,
    pub history: Vec<TickOutputs>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl TestContext {
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let board = Scoreboard::new(config).expect("test configuration must be valid");
        Self {
            board,
            history: Vec::new(),
        }
    }

    /// Runs one tick and records its outputs.
    pub fn tick(&mut self, inputs: TickInputs) -> TickOutputs {
        let out = self.board.tick(&inputs).expect("tick inputs must be in range");
        self.history.push(out.clone());
        out
    }

    /// Runs one tick, returning the error instead of panicking.
    pub fn try_tick(&mut self, inputs: &TickInputs) -> Result<TickOutputs, ScoreboardError> {
        self.board.tick(inputs)
    }

    /// Runs `n` ticks with nothing asserted.
    pub fn idle(&mut self, n: usize) {
        for _ in 0..n {
            let _ = self.tick(TickInputs::default());
        }
    }

    /// Outputs for the current state with nothing asserted.
    pub fn view(&self) -> TickOutputs {
        self.board.view().expect("view never fails on a built scoreboard")
    }

    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot()
    }

    /// True if every dependency cell of `unit` is idle.
    pub fn row_idle(&self, unit: usize) -> bool {
        self.board.state().matrix.row(unit).iter().all(|c| c.is_idle())
    }

    pub fn busy(&self) -> &PendingVector {
        &self.board.state().busy
    }
}
