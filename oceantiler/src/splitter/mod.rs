//! Parallel quad-cell differencing.
//!
//! The planet is recursively subdivided into quad cells; for each cell a
//! worker computes the ocean as the difference between the cell envelope
//! and the indexed land regions. Cells whose result exceeds the point
//! budget are replaced by their four children on the shared work queue.
//!
//! # Architecture
//!
//! ```text
//! seed: all cells on base_level
//!        │
//!        ▼
//! ┌─────────────────────────────┐
//! │ shared FIFO + in_progress   │◄─── children of over-budget cells
//! │ (one Mutex, one Condvar)    │
//! └─────────────────────────────┘
//!        │ pop
//!        ▼
//! worker: envelope → fold land → budget check → result callback
//! ```
//!
//! Termination is global quiescence, not queue emptiness: a worker that
//! is still differencing may push four children, so waiters block until
//! the queue is non-empty or `in_progress` drops to zero.

mod config;
mod difference;

pub use config::{SplitterConfig, HIGH_LEVEL, MAX_CELL_POINTS, START_LEVEL};
pub use difference::CellDifference;

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::thread;

use tracing::debug;

use crate::cell::{cell_bounds, CellId};
use crate::coord::{self, PointD};
use crate::geo_index::RegionIndex;
use crate::region::Region;

struct QueueState {
    tasks: VecDeque<CellId>,
    in_progress: usize,
}

struct SplitterContext {
    state: Mutex<QueueState>,
    cond: Condvar,
}

/// Run the splitter over every cell of `config.base_level`.
///
/// `on_result` is invoked once per accepted cell, from worker threads,
/// without any internal lock held. Invocation order is nondeterministic;
/// the per-cell geometry is not.
pub fn process<F>(config: &SplitterConfig, index: &RegionIndex, on_result: F)
where
    F: Fn(CellId, CellDifference) + Sync,
{
    let tasks: VecDeque<CellId> = CellId::cells_on_level(config.base_level).collect();
    debug!(
        threads = config.threads,
        seed_cells = tasks.len(),
        "starting cell splitter"
    );

    let ctx = SplitterContext {
        state: Mutex::new(QueueState {
            tasks,
            in_progress: 0,
        }),
        cond: Condvar::new(),
    };

    thread::scope(|scope| {
        for i in 0..config.threads.max(1) {
            thread::Builder::new()
                .name(format!("cell-splitter-{}", i))
                .spawn_scoped(scope, || worker_loop(&ctx, config, index, &on_result))
                .expect("failed to spawn splitter worker thread");
        }
    });
}

fn worker_loop<F>(
    ctx: &SplitterContext,
    config: &SplitterConfig,
    index: &RegionIndex,
    on_result: &F,
) where
    F: Fn(CellId, CellDifference),
{
    loop {
        let mut state = ctx.state.lock().expect("splitter queue lock poisoned");
        state = ctx
            .cond
            .wait_while(state, |s| s.tasks.is_empty() && s.in_progress > 0)
            .expect("splitter queue lock poisoned");
        // queue drained and nothing in flight: global quiescence
        let Some(cell) = state.tasks.pop_front() else {
            break;
        };
        state.in_progress += 1;
        drop(state);

        let accepted = process_cell(cell, config, index, on_result);

        let mut state = ctx.state.lock().expect("splitter queue lock poisoned");
        if !accepted {
            state.tasks.extend(cell.children());
        }
        state.in_progress -= 1;
        // every decrement may be the one reaching quiescence
        ctx.cond.notify_all();
    }
}

/// Difference one cell; false means the cell was over budget and must
/// be re-queued as its four children.
fn process_cell<F>(cell: CellId, config: &SplitterConfig, index: &RegionIndex, on_result: &F) -> bool
where
    F: Fn(CellId, CellDifference),
{
    let (min_x, min_y, max_x, max_y) = cell_bounds(cell);
    let envelope = Region::from_points([
        coord::encode(PointD::new(min_x, min_y)),
        coord::encode(PointD::new(min_x, max_y)),
        coord::encode(PointD::new(max_x, max_y)),
        coord::encode(PointD::new(max_x, min_y)),
    ]);

    let mut difference = CellDifference::new(envelope);
    index.for_each_in_rect(difference.cell_rect(), |land| difference.fold(land));

    if cell.level() < config.max_level && difference.points_count() >= config.max_points {
        return false;
    }
    on_result(cell, difference);
    true
}
