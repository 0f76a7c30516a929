//! Scripted in-memory service used by unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rvm_domain::{ActuatorHardwareStatus, ActuatorReport, KioskError, Result, SystemStatus};

use crate::ports::KioskService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Status,
    Scan,
    Confirm,
    Reject,
    Reset,
    Actuator,
}

#[derive(Clone)]
struct Step {
    delay: Duration,
    result: Result<SystemStatus>,
}

/// Each operation replays its queued results in order; the last one sticks.
pub(crate) struct ScriptedService {
    scripts: Mutex<HashMap<Op, VecDeque<Step>>>,
    calls: Mutex<HashMap<Op, usize>>,
    healthy: AtomicBool,
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub(crate) fn push(&self, op: Op, result: Result<SystemStatus>) {
        self.push_delayed(op, Duration::ZERO, result);
    }

    pub(crate) fn push_delayed(&self, op: Op, delay: Duration, result: Result<SystemStatus>) {
        self.scripts.lock().unwrap().entry(op).or_default().push_back(Step { delay, result });
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    async fn next(&self, op: Op) -> Result<SystemStatus> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;

        let step = {
            let mut scripts = self.scripts.lock().unwrap();
            let queue = scripts.entry(op).or_default();
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.result
            }
            None => Err(KioskError::Internal(format!("no script for {op:?}"))),
        }
    }
}

#[async_trait]
impl KioskService for ScriptedService {
    async fn get_status(&self) -> Result<SystemStatus> {
        self.next(Op::Status).await
    }

    async fn start_scan(&self) -> Result<SystemStatus> {
        self.next(Op::Scan).await
    }

    async fn confirm(&self) -> Result<SystemStatus> {
        self.next(Op::Confirm).await
    }

    async fn reject_invalid_item(&self) -> Result<SystemStatus> {
        self.next(Op::Reject).await
    }

    async fn reset(&self) -> Result<SystemStatus> {
        self.next(Op::Reset).await
    }

    async fn probe_health(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn trigger_actuator(&self) -> Result<ActuatorReport> {
        self.next(Op::Actuator).await.map(|_| ActuatorReport {
            success: true,
            message: "triggered".into(),
            trapdoor_triggered: true,
            coupon_triggered: true,
            arduino_status: ActuatorHardwareStatus {
                connected: true,
                trapdoor_open: true,
                coupon_printed: true,
            },
            timestamp: "2025-01-15T10:00:00".into(),
        })
    }
}
