mod config;
mod forces;
mod interaction;
mod state;

use std::sync::mpsc::{self, RecvTimeoutError, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use tracing::{debug, trace, warn};

use crate::error::LayoutResult;
use crate::graph::Graph;
pub use config::SimulationConfig;
pub use state::{Anchor, LayoutRng, SimNode, Snapshot, Viewport};
use state::SimState;

/// Lifecycle of the background tick loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    /// Never started, or cooled down on its own.
    Idle,
    Running,
    /// Halted by `stop()` before converging.
    Stopped,
}

/// A force-directed layout of one graph inside one viewport.
///
/// A background thread ticks the simulation at a fixed cadence while any
/// number of readers call [`Simulation::snapshot`]. Every tick (and every
/// pin change) publishes a fresh immutable [`Snapshot`], so readers never
/// observe a half-applied tick.
pub struct Simulation {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

struct Shared {
    graph: Arc<Graph>,
    config: SimulationConfig,
    state: Mutex<SimState>,
    published: RwLock<Arc<Snapshot>>,
    lifecycle: Mutex<Lifecycle>,
}

struct Lifecycle {
    status: DriverStatus,
    generation: u64,
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Simulation {
    /// Default tunables and an entropy-seeded layout.
    pub fn create(graph: Graph, width: f32, height: f32) -> LayoutResult<Self> {
        Self::with_config(
            graph,
            width,
            height,
            SimulationConfig::default(),
            LayoutRng::from_entropy(),
        )
    }

    pub fn with_config(
        graph: Graph,
        width: f32,
        height: f32,
        config: SimulationConfig,
        rng: LayoutRng,
    ) -> LayoutResult<Self> {
        let viewport = Viewport::new(width, height)?;
        config.validate()?;

        let graph = Arc::new(graph);
        let state = SimState::new(&graph, viewport, rng);
        let published = RwLock::new(Arc::new(state.snapshot(&graph)));
        debug!(
            nodes = graph.node_count(),
            links = graph.links().len(),
            width,
            height,
            "created simulation"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                graph,
                config,
                state: Mutex::new(state),
                published,
                lifecycle: Mutex::new(Lifecycle {
                    status: DriverStatus::Idle,
                    generation: 0,
                }),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Start ticking in the background. Restarts the loop if it is already
    /// running.
    pub fn start(&self) {
        let mut slot = lock(&self.worker);
        if let Some(worker) = slot.take() {
            worker.shutdown();
        }

        let generation = {
            let mut lifecycle = lock(&self.shared.lifecycle);
            lifecycle.generation = lifecycle.generation.wrapping_add(1);
            lifecycle.status = DriverStatus::Running;
            lifecycle.generation
        };

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || run_loop(&shared, &stop_rx, generation));
        *slot = Some(Worker { stop_tx, handle });
        debug!(generation, "simulation started");
    }

    /// Halt ticking, keeping the current layout. A tick already in progress
    /// completes first.
    pub fn stop(&self) {
        let mut slot = lock(&self.worker);
        if let Some(worker) = slot.take() {
            worker.shutdown();
        }

        let mut lifecycle = lock(&self.shared.lifecycle);
        if lifecycle.status == DriverStatus::Running {
            lifecycle.status = DriverStatus::Stopped;
            debug!("simulation stopped");
        }
    }

    /// Re-scatter every node (dropping pins), re-arm alpha and start ticking.
    pub fn reset(&self) {
        if let Some(worker) = lock(&self.worker).take() {
            worker.shutdown();
        }
        self.shared.with_state(SimState::randomize);
        debug!("simulation reset");
        self.start();
    }

    /// Latest published view of every node, in graph order.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let published = self
            .shared
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&published)
    }

    /// Advance one tick on the caller's thread. Does nothing (and returns
    /// `false`) while the background loop is running or once converged.
    pub fn step(&self) -> bool {
        if self.status() == DriverStatus::Running {
            return false;
        }
        self.shared.tick()
    }

    /// Tick on the caller's thread until alpha reaches its floor. Stops the
    /// background loop first. Returns the number of ticks taken.
    pub fn run_to_convergence(&self) -> u64 {
        self.stop();
        let mut ticks = 0;
        while self.shared.tick() {
            ticks += 1;
        }
        debug!(ticks, "ran to convergence");
        ticks
    }

    pub fn status(&self) -> DriverStatus {
        lock(&self.shared.lifecycle).status
    }

    pub fn is_running(&self) -> bool {
        self.status() == DriverStatus::Running
    }

    pub fn alpha(&self) -> f32 {
        self.snapshot().alpha
    }

    pub fn tick_count(&self) -> u64 {
        self.snapshot().tick
    }

    pub fn graph(&self) -> &Graph {
        &self.shared.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }

    pub fn viewport(&self) -> Viewport {
        lock(&self.shared.state).viewport()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        let slot = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(worker) = slot.take() {
            worker.shutdown();
        }
    }
}

impl Shared {
    /// Run `update` against the working copy and publish the result.
    fn with_state<R>(&self, update: impl FnOnce(&mut SimState) -> R) -> R {
        let mut state = lock(&self.state);
        let result = update(&mut state);
        self.publish(state.snapshot(&self.graph));
        result
    }

    /// One tick if still hot. Returns whether a tick ran.
    fn tick(&self) -> bool {
        self.with_state(|state| {
            if state.is_converged(&self.config) {
                return false;
            }
            state.tick(&self.graph, &self.config);
            trace!(tick = state.ticks, alpha = state.alpha, "tick");
            true
        })
    }

    fn is_converged(&self) -> bool {
        lock(&self.state).is_converged(&self.config)
    }

    fn publish(&self, snapshot: Snapshot) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *published = Arc::new(snapshot);
    }

    /// Mark the loop of `generation` as finished unless a newer start or a
    /// stop has already taken over.
    fn finish(&self, generation: u64) {
        let mut lifecycle = lock(&self.lifecycle);
        if lifecycle.generation == generation && lifecycle.status == DriverStatus::Running {
            lifecycle.status = DriverStatus::Idle;
            debug!(generation, "simulation converged");
        }
    }
}

impl Worker {
    fn shutdown(self) {
        drop(self.stop_tx);
        if self.handle.join().is_err() {
            warn!("simulation tick thread panicked");
        }
    }
}

fn run_loop(shared: &Shared, stop_rx: &Receiver<()>, generation: u64) {
    let interval = shared.config.tick_interval();
    loop {
        if !shared.tick() || shared.is_converged() {
            break;
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
    shared.finish(generation);
}
