//! The tick engine - drives a scheduler at a fixed period.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::scheduler::Scheduler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// User code hosted by a [`TickEngine`].
///
/// Create subsystems, commands and bindings in `initialize`; put per-cycle
/// logic that is not a command in `periodic`.
pub trait Routine {
    /// Called once when the engine starts.
    fn initialize(&mut self, scheduler: &mut Scheduler);

    /// Called every cycle, after the scheduler tick. Return
    /// `ControlFlow::Break(())` to stop the engine.
    fn periodic(&mut self, _scheduler: &mut Scheduler) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called once when the engine stops, before every command is cancelled.
    fn stop(&mut self, _scheduler: &mut Scheduler) {}
}

/// Runs the control loop:
/// ```text
/// start → (tick → routine periodic → wait for period)* → stop
/// ```
pub struct TickEngine<R: Routine> {
    routine: R,
    scheduler: Scheduler,
    config: EngineConfig,
    started_at: Option<DateTime<Utc>>,
    cycles_run: u64,
    overruns: u64,
}

impl<R: Routine> TickEngine<R> {
    /// Create an engine with the default configuration.
    pub fn new(routine: R) -> Self {
        let config = EngineConfig::default();
        Self {
            routine,
            scheduler: Scheduler::with_config(config.scheduler.clone()),
            config,
            started_at: None,
            cycles_run: 0,
            overruns: 0,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.scheduler.set_config(config.scheduler.clone());
        self.config = config;
        self
    }

    /// Validate the configuration and initialize the routine.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.started_at.is_some() {
            return Err(EngineError::AlreadyStarted);
        }
        self.config.validate()?;

        self.cycles_run = 0;
        self.overruns = 0;
        self.started_at = Some(Utc::now());
        self.routine.initialize(&mut self.scheduler);

        info!(
            period_ms = self.config.period_ms,
            max_cycles = ?self.config.max_cycles,
            subsystems = self.scheduler.subsystems().len(),
            "Engine started"
        );
        Ok(())
    }

    /// Run one cycle: a scheduler tick followed by the routine's periodic hook.
    pub fn run_cycle(&mut self) -> Result<CycleReport, EngineError> {
        if self.started_at.is_none() {
            return Err(EngineError::NotStarted);
        }

        let begin = Instant::now();
        self.scheduler.tick();
        let flow = self.routine.periodic(&mut self.scheduler);
        let elapsed = begin.elapsed();

        self.cycles_run += 1;
        let overrun = elapsed > self.config.period();
        if overrun {
            self.overruns += 1;
            if self.config.warn_on_overrun {
                warn!(
                    cycle = self.cycles_run,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    period_ms = self.config.period_ms,
                    "Cycle overran its period"
                );
            }
        }

        Ok(CycleReport {
            cycle: self.cycles_run,
            elapsed,
            active_commands: self.scheduler.active_count(),
            overrun,
            stop_requested: flow.is_break(),
        })
    }

    /// Stop the routine and cancel every running command.
    pub fn stop(&mut self) -> Result<EngineSummary, EngineError> {
        let Some(started_at) = self.started_at.take() else {
            return Err(EngineError::NotStarted);
        };

        self.routine.stop(&mut self.scheduler);
        self.scheduler.cancel_all();

        let summary = EngineSummary {
            cycles: self.cycles_run,
            overruns: self.overruns,
            started_at,
            finished_at: Utc::now(),
        };
        info!(cycles = summary.cycles, overruns = summary.overruns, "Engine stopped");
        Ok(summary)
    }

    /// Run cycles at the configured period until `max_cycles` is reached or
    /// the routine asks to stop. Starts the engine first if needed.
    pub async fn run(&mut self) -> Result<EngineSummary, EngineError> {
        if self.started_at.is_none() {
            self.start()?;
        }

        let mut interval = tokio::time::interval(self.config.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if let Some(max) = self.config.max_cycles {
                if self.cycles_run >= max {
                    info!("Reached max cycles ({})", max);
                    break;
                }
            }

            interval.tick().await;
            let report = self.run_cycle()?;
            if report.stop_requested {
                debug!(cycle = report.cycle, "Routine requested stop");
                break;
            }
        }

        self.stop()
    }

    /// Whether the engine has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Cycles run since the last start.
    pub fn cycles(&self) -> u64 {
        self.cycles_run
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Get a mutable reference to the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Get a reference to the routine.
    pub fn routine(&self) -> &R {
        &self.routine
    }
}

/// Result of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// Time spent in the tick and the periodic hook
    pub elapsed: Duration,
    /// Commands running after the cycle
    pub active_commands: usize,
    /// Whether the cycle took longer than the period
    pub overrun: bool,
    /// Whether the routine asked to stop
    pub stop_requested: bool,
}

/// What an engine run did.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    /// Cycles run
    pub cycles: u64,
    /// Cycles that overran the period
    pub overruns: u64,
    /// When the engine started
    pub started_at: DateTime<Utc>,
    /// When the engine stopped
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use cadence_commands::{factory, CommandExt};
    use cadence_core::CommandHandle;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Script {
        log: Rc<RefCell<Vec<String>>>,
        periodic_calls: usize,
        stop_after: Option<usize>,
        spinner: Option<CommandHandle>,
    }

    impl Routine for Script {
        fn initialize(&mut self, scheduler: &mut Scheduler) {
            let log = self.log.clone();
            let spinner = factory::start_end(
                {
                    let log = log.clone();
                    move || log.borrow_mut().push("spin:start".into())
                },
                move || log.borrow_mut().push("spin:end".into()),
            )
            .into_named_handle("spinner");
            scheduler.schedule(&spinner);
            self.spinner = Some(spinner);
        }

        fn periodic(&mut self, _scheduler: &mut Scheduler) -> ControlFlow<()> {
            self.periodic_calls += 1;
            match self.stop_after {
                Some(n) if self.periodic_calls >= n => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        }

        fn stop(&mut self, _scheduler: &mut Scheduler) {
            self.log.borrow_mut().push("routine:stop".into());
        }
    }

    #[test]
    fn test_cycle_before_start_fails() {
        let mut engine = TickEngine::new(Script::default());
        assert!(matches!(engine.run_cycle(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.stop(), Err(EngineError::NotStarted)));
    }

    #[test]
    fn test_start_twice_fails() {
        let mut engine = TickEngine::new(Script::default());
        engine.start().unwrap();
        assert!(engine.is_running());
        assert!(matches!(engine.start(), Err(EngineError::AlreadyStarted)));
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let config = EngineConfig {
            period_ms: 0,
            ..EngineConfig::default()
        };
        let mut engine = TickEngine::new(Script::default()).with_config(config);
        assert!(matches!(engine.start(), Err(EngineError::Config(_))));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_stop_runs_routine_stop_then_cancels() {
        let script = Script::default();
        let log = script.log.clone();
        let mut engine = TickEngine::new(script);

        engine.start().unwrap();
        let report = engine.run_cycle().unwrap();
        assert_eq!(report.cycle, 1);
        assert_eq!(report.active_commands, 1);
        assert!(!report.stop_requested);

        let summary = engine.stop().unwrap();
        assert_eq!(summary.cycles, 1);
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(*log.borrow(), vec!["spin:start", "routine:stop", "spin:end"]);
        assert_eq!(engine.scheduler().active_count(), 0);
    }

    #[test]
    fn test_scheduler_config_applied() {
        let config = EngineConfig::new().with_scheduler(SchedulerConfig { trace_ticks: true });
        let engine = TickEngine::new(Script::default()).with_config(config);
        assert!(engine.scheduler().config().trace_ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_max_cycles() {
        let config = EngineConfig::new()
            .with_period(Duration::from_millis(10))
            .with_max_cycles(5);
        let mut engine = TickEngine::new(Script::default()).with_config(config);

        let begin = Instant::now();
        let summary = engine.run().await.unwrap();

        assert_eq!(summary.cycles, 5);
        assert_eq!(engine.routine().periodic_calls, 5);
        assert!(begin.elapsed() >= Duration::from_millis(40));
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_routine_breaks() {
        let script = Script {
            stop_after: Some(3),
            ..Script::default()
        };
        let mut engine = TickEngine::new(script);

        let summary = engine.run().await.unwrap();
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.overruns, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_advance_each_cycle() {
        struct Counter {
            runs: Rc<Cell<u32>>,
        }

        impl Routine for Counter {
            fn initialize(&mut self, scheduler: &mut Scheduler) {
                let runs = self.runs.clone();
                let command = factory::run(move || runs.set(runs.get() + 1)).into_handle();
                scheduler.schedule(&command);
            }
        }

        let runs = Rc::new(Cell::new(0));
        let config = EngineConfig::new().with_max_cycles(4);
        let mut engine = TickEngine::new(Counter { runs: runs.clone() }).with_config(config);

        engine.run().await.unwrap();
        assert_eq!(runs.get(), 4);
        assert_eq!(engine.cycles(), 4);
    }

    #[test]
    fn test_summary_serializes() {
        let mut engine = TickEngine::new(Script::default());
        engine.start().unwrap();
        let summary = engine.stop().unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["cycles"], 0);
        assert!(json["started_at"].is_string());
    }
}
