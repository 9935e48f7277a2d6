//! Cooperative task cadence for the control loop.
//!
//! The loop calls [`TaskScheduler::due`] on every pass; each periodic task
//! fires once its period has elapsed since it last ran.  Nothing here
//! blocks or sleeps; pacing comes from the loop itself.
//!
//! | Task          | Period  |
//! |---------------|---------|
//! | `GesturePoll` | 50 ms   |
//! | `ClimateTick` | 1 s     |
//! | `Heartbeat`   | 10 s    |

use heapless::Vec;
use log::info;

use crate::sensors::gesture::POLL_INTERVAL_MS;

// ═══════════════════════════════════════════════════════════════
//  Task table
// ═══════════════════════════════════════════════════════════════

/// Sensor refresh / monitor evaluation cadence.
pub const CLIMATE_PERIOD_MS: u64 = 1_000;
/// Periodic webhook cadence.
pub const HEARTBEAT_PERIOD_MS: u64 = 10_000;

const TASK_COUNT: usize = 3;

/// Work items the control loop knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    GesturePoll,
    ClimateTick,
    Heartbeat,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    task: Task,
    period_ms: u64,
    last_run_ms: u64,
    enabled: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct TaskScheduler {
    slots: [Slot; TASK_COUNT],
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    /// All tasks enabled, first runs one period after boot.
    pub fn new() -> Self {
        let slot = |task, period_ms| Slot {
            task,
            period_ms,
            last_run_ms: 0,
            enabled: true,
        };
        Self {
            slots: [
                slot(Task::GesturePoll, POLL_INTERVAL_MS),
                slot(Task::ClimateTick, CLIMATE_PERIOD_MS),
                slot(Task::Heartbeat, HEARTBEAT_PERIOD_MS),
            ],
        }
    }

    /// Tasks due at `now_ms`, in table order.  Marks them as run.
    pub fn due(&mut self, now_ms: u64) -> Vec<Task, TASK_COUNT> {
        let mut out = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.enabled) {
            if now_ms.saturating_sub(slot.last_run_ms) >= slot.period_ms {
                slot.last_run_ms = now_ms;
                // Capacity equals the slot count.
                let _ = out.push(slot.task);
            }
        }
        out
    }

    pub fn set_enabled(&mut self, task: Task, enabled: bool) {
        for slot in self.slots.iter_mut().filter(|s| s.task == task) {
            if slot.enabled != enabled {
                info!("Scheduler: {:?} {}", task, if enabled { "enabled" } else { "disabled" });
            }
            slot.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, task: Task) -> bool {
        self.slots.iter().any(|s| s.task == task && s.enabled)
    }
}
