//! Watchdog task to reset the board if the poll loop stops
//!
//! The poll loop reports after every cycle. Instead of feeding the hardware watchdog
//! all the time, this task keeps a countdown: once the poll loop is overdue the
//! countdown starts, and if it runs out the hardware watchdog is started and never
//! fed, which resets the board.
//!
//! Nothing is checked during the start-up grace period, so BLE bring-up and a boot
//! self test cannot trigger a reset.

use defmt::{Format, info, warn};
use embassy_rp::{Peri, peripherals::WATCHDOG, watchdog::Watchdog};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::{Duration, Instant, Timer};

/// How long the countdown runs once a task is overdue
const COUNTDOWN_TIMEOUT: Duration = Duration::from_secs(60);
/// How often task health is checked
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);
/// Nothing is checked this long after boot
const STARTUP_GRACE: Duration = Duration::from_secs(120);
/// Hardware watchdog timeout (short, used only for actual reset)
const HARDWARE_WATCHDOG_TIMEOUT: Duration = Duration::from_millis(8000);

/// Task identifiers for health tracking
#[derive(Debug, Clone, Copy, Eq, PartialEq, Format)]
pub enum TaskId {
    /// Poll loop (clock ticks and commands), reports every cycle
    PollLoop,
}

impl TaskId {
    /// All monitored tasks, in index order
    const ALL: [Self; 1] = [Self::PollLoop];

    /// Returns the maximum time allowed between health reports for this task
    const fn max_report_interval(self) -> Duration {
        match self {
            // ticks come every tick_interval_secs, at most a minute apart
            Self::PollLoop => Duration::from_secs(180),
        }
    }
}

/// Task health tracking with last-seen timestamp
#[derive(Copy, Clone, Format, Debug)]
struct TaskHealth {
    /// When this task last reported success
    last_report: Option<Instant>,
}

impl TaskHealth {
    /// Create a new `TaskHealth` instance
    const fn new() -> Self {
        Self { last_report: None }
    }

    /// Check if this task is healthy based on its max report interval
    fn is_healthy(&self, max_interval: Duration) -> bool {
        self.last_report
            .is_some_and(|last| Instant::now().duration_since(last) < max_interval)
    }
}

/// System health state with countdown
struct SystemHealth {
    /// Health status of each task, indexed by `TaskId`
    tasks: [TaskHealth; TaskId::ALL.len()],
    /// When the watchdog task started
    startup_time: Option<Instant>,
    /// When this passes, the hardware watchdog is started
    countdown_deadline: Option<Instant>,
}

impl SystemHealth {
    /// Create a new `SystemHealth` instance
    const fn new() -> Self {
        Self {
            tasks: [TaskHealth::new(); TaskId::ALL.len()],
            startup_time: None,
            countdown_deadline: None,
        }
    }

    /// Report a task as succeeded
    fn set_task_succeeded(&mut self, task_id: TaskId) {
        self.tasks[task_id as usize].last_report = Some(Instant::now());
    }

    /// Check if we're still in startup grace period
    fn in_startup_grace_period(&mut self) -> bool {
        let started = *self.startup_time.get_or_insert_with(Instant::now);
        Instant::now().duration_since(started) < STARTUP_GRACE
    }

    /// Start, keep or clear the countdown depending on task health
    fn update_overall_health(&mut self) {
        if self.in_startup_grace_period() {
            return;
        }

        let mut unhealthy_count = 0;
        for task_id in TaskId::ALL {
            // a task that never reported after the grace period is overdue as well
            if !self.tasks[task_id as usize].is_healthy(task_id.max_report_interval()) {
                unhealthy_count += 1;
                warn!("Task {:?} is overdue", task_id);
            }
        }

        if unhealthy_count == 0 {
            if self.countdown_deadline.take().is_some() {
                info!("All tasks healthy again - countdown cleared");
            }
        } else if self.countdown_deadline.is_none() {
            warn!("{} task(s) overdue, starting countdown", unhealthy_count);
            self.countdown_deadline = Some(Instant::now() + COUNTDOWN_TIMEOUT);
        } else if let Some(remaining) = self.time_until_reset() {
            warn!(
                "{} task(s) still overdue, {} seconds until reset",
                unhealthy_count,
                remaining.as_secs()
            );
        }
    }

    /// Check if countdown has expired and we should trigger hardware watchdog
    fn should_trigger_reset(&self) -> bool {
        self.countdown_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Get remaining time until reset
    fn time_until_reset(&self) -> Option<Duration> {
        self.countdown_deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Global system health tracker
static SYSTEM_HEALTH: Mutex<CriticalSectionRawMutex, SystemHealth> = Mutex::new(SystemHealth::new());

/// Report a successful task iteration
pub async fn report_task_success(task_id: TaskId) {
    let mut health = SYSTEM_HEALTH.lock().await;
    health.set_task_succeeded(task_id);
}

/// Watchdog task that monitors system health and triggers resets when needed
///
/// # Arguments
/// * `watchdog` - The watchdog peripheral from the RP2040
#[embassy_executor::task]
pub async fn watchdog_task(watchdog: Peri<'static, WATCHDOG>) {
    info!(
        "Watchdog started - countdown: {}s, health checks every {}s, startup grace: {}s",
        COUNTDOWN_TIMEOUT.as_secs(),
        HEALTH_CHECK_INTERVAL.as_secs(),
        STARTUP_GRACE.as_secs()
    );

    loop {
        let should_reset = {
            let mut health = SYSTEM_HEALTH.lock().await;
            health.update_overall_health();
            health.should_trigger_reset()
        };

        if should_reset {
            warn!("Countdown expired - system will reset");

            // Initialize hardware watchdog and don't feed it - this will cause reset
            let mut wd = Watchdog::new(watchdog);
            wd.pause_on_debug(false);
            wd.start(HARDWARE_WATCHDOG_TIMEOUT);

            warn!(
                "Hardware watchdog started - system will reset in {}ms",
                HARDWARE_WATCHDOG_TIMEOUT.as_millis()
            );

            loop {
                Timer::after_secs(1).await;
            }
        }

        Timer::after(HEALTH_CHECK_INTERVAL).await;
    }
}
