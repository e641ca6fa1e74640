use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::commands::timer::formatters::TimerFormatter;
use crate::commands::timer::manager::TimerManager;
use crate::commands::timer::models::TickOutcome;
use crate::commands::timer::notifier::{deliver, Notifier};
use crate::error::{Error, Result};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A cancellable reference to the running tick loop.
#[derive(Debug)]
pub struct TickHandle {
    abort: Option<AbortHandle>,
}

impl TickHandle {
    pub fn new(abort: AbortHandle) -> Self {
        TickHandle { abort: Some(abort) }
    }

    // A handle without a task behind it.
    pub fn detached() -> Self {
        TickHandle { abort: None }
    }

    pub fn is_active(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|abort| !abort.is_finished())
    }

    // Halting an already halted loop is a no-op.
    pub fn halt(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }
}

pub trait TickSchedule: Send + Sync {
    // Starts firing ticks for the session and returns the handle to halt them.
    fn schedule(&self, session_id: Uuid) -> Result<TickHandle>;
}

pub struct TickScheduler {
    manager: Arc<TimerManager>,
    notifier: Arc<dyn Notifier>,
    formatter: Arc<dyn TimerFormatter>,
    period: Duration,
}

impl TickScheduler {
    pub fn new(
        manager: Arc<TimerManager>,
        notifier: Arc<dyn Notifier>,
        formatter: Arc<dyn TimerFormatter>,
    ) -> Self {
        TickScheduler {
            manager,
            notifier,
            formatter,
            period: TICK_PERIOD,
        }
    }
}

impl TickSchedule for TickScheduler {
    fn schedule(&self, session_id: Uuid) -> Result<TickHandle> {
        let runtime = Handle::try_current()
            .map_err(|err| Error::Scheduler(format!("No async runtime for the tick loop: {}", err)))?;

        let tick_loop = runtime.spawn(run_tick_loop(
            self.manager.clone(),
            self.notifier.clone(),
            self.formatter.clone(),
            session_id,
            self.period,
        ));
        let handle = TickHandle::new(tick_loop.abort_handle());

        runtime.spawn(supervise_tick_loop(
            self.manager.clone(),
            self.notifier.clone(),
            self.formatter.clone(),
            session_id,
            tick_loop,
        ));

        Ok(handle)
    }
}

#[instrument(skip(manager, notifier, formatter, period))]
async fn run_tick_loop(
    manager: Arc<TimerManager>,
    notifier: Arc<dyn Notifier>,
    formatter: Arc<dyn TimerFormatter>,
    session_id: Uuid,
    period: Duration,
) -> Result<()> {
    let mut interval = time::interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        match manager.tick(session_id)? {
            TickOutcome::Continue { .. } => continue,
            TickOutcome::Halted => {
                debug!("The timer is no longer running, halting the tick loop.");
                return Ok(());
            }
            TickOutcome::Finished(announcement) => {
                info!("Timer has ended in {}", announcement.channel.display_name());
                let content = formatter.announcement(&announcement);
                deliver(notifier.as_ref(), &announcement.channel, &content).await;
                return Ok(());
            }
        }
    }
}

// Waits for the tick loop to exit and cleans up when it died with the timer still running.
async fn supervise_tick_loop(
    manager: Arc<TimerManager>,
    notifier: Arc<dyn Notifier>,
    formatter: Arc<dyn TimerFormatter>,
    session_id: Uuid,
    tick_loop: JoinHandle<Result<()>>,
) {
    match tick_loop.await {
        Ok(Ok(())) => debug!("The tick loop of timer {} has finished.", session_id),
        Ok(Err(err)) => error!(
            "The tick loop of timer {} has failed: {}",
            session_id,
            err.to_string()
        ),
        Err(err) if err.is_cancelled() => {
            debug!("The tick loop of timer {} was cancelled.", session_id)
        }
        Err(err) => error!(
            "The tick loop of timer {} has crashed: {}",
            session_id,
            err.to_string()
        ),
    }

    if let Some(channel) = manager.recover(session_id) {
        deliver(notifier.as_ref(), &channel, &formatter.interrupted()).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use uuid::Uuid;

    use crate::commands::timer::formatters::{DefaultTimerFormatter, TimerFormatter};
    use crate::commands::timer::manager::TimerManager;
    use crate::commands::timer::models::{ChannelRef, Participant};
    use crate::commands::timer::notifier::testing::RecordingNotifier;
    use crate::commands::timer::notifier::Notifier;
    use crate::commands::timer::scheduler::{
        supervise_tick_loop, TickHandle, TickSchedule, TickScheduler,
    };
    use crate::error::{Error, Result};

    struct Fixture {
        manager: Arc<TimerManager>,
        notifier: Arc<RecordingNotifier>,
        formatter: Arc<dyn TimerFormatter>,
    }

    impl Fixture {
        fn new(notifier: RecordingNotifier) -> Self {
            Fixture {
                manager: Arc::new(TimerManager::new()),
                notifier: Arc::new(notifier),
                formatter: Arc::new(DefaultTimerFormatter::new("!")),
            }
        }

        fn scheduler(&self) -> TickScheduler {
            let notifier: Arc<dyn Notifier> = self.notifier.clone();
            TickScheduler::new(self.manager.clone(), notifier, self.formatter.clone())
        }
    }

    fn general() -> ChannelRef {
        ChannelRef::new(10, Some("general".to_string()))
    }

    #[test]
    fn test_detached_handle_is_inactive() {
        let handle = TickHandle::detached();

        assert_eq!(handle.is_active(), false);
        handle.halt();
        handle.halt();
    }

    #[tokio::test]
    async fn test_halt_is_idempotent() {
        let task = tokio::spawn(std::future::pending::<()>());
        let handle = TickHandle::new(task.abort_handle());
        assert_eq!(handle.is_active(), true);

        handle.halt();
        handle.halt();
        assert_eq!(task.await.unwrap_err().is_cancelled(), true);
        assert_eq!(handle.is_active(), false);
    }

    #[test]
    fn test_schedule_outside_of_runtime_fails() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");

        let result = fixture
            .manager
            .start(&starter, &general(), 1, &fixture.scheduler());
        assert_eq!(matches!(result, Err(Error::Scheduler(_))), true);
        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_completes_and_announces() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");
        let joiner = Participant::new(2, "Joiner");
        fixture
            .manager
            .start(&starter, &general(), 1, &fixture.scheduler())
            .unwrap();
        fixture.manager.join(&joiner, &general()).unwrap();

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        let status = fixture.manager.status().unwrap();
        assert_eq!(status.running, true);
        assert_eq!(status.remaining_seconds, 30);
        assert_eq!(fixture.notifier.sent().is_empty(), true);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
        assert_eq!(
            fixture.notifier.sent(),
            vec![(10, "⏰ Timer ended! <@1> <@2> Time's up!".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_countdown_sends_nothing_more() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");
        fixture
            .manager
            .start(&starter, &general(), 1, &fixture.scheduler())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        fixture.manager.stop(&starter, &general(), false).unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
        assert_eq!(fixture.notifier.sent().is_empty(), true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_runs_a_fresh_countdown() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");
        let scheduler = fixture.scheduler();
        fixture.manager.start(&starter, &general(), 1, &scheduler).unwrap();
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        fixture.manager.stop(&starter, &general(), false).unwrap();

        fixture.manager.start(&starter, &general(), 1, &scheduler).unwrap();
        tokio::time::sleep(Duration::from_millis(20_500)).await;

        assert_eq!(fixture.manager.status().unwrap().remaining_seconds, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_with_failed_delivery_still_resets() {
        let fixture = Fixture::new(RecordingNotifier::failing());
        let starter = Participant::new(1, "Starter");
        fixture
            .manager
            .start(&starter, &general(), 1, &fixture.scheduler())
            .unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
        assert_eq!(fixture.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_crashed_tick_loop_is_recovered() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");
        let snapshot = fixture
            .manager
            .start(&starter, &general(), 1, &ManualTick)
            .unwrap();

        let crashed = tokio::spawn(crashing_tick_loop());
        let notifier: Arc<dyn Notifier> = fixture.notifier.clone();
        supervise_tick_loop(
            fixture.manager.clone(),
            notifier,
            fixture.formatter.clone(),
            snapshot.session_id,
            crashed,
        )
        .await;

        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
        assert_eq!(
            fixture.notifier.sent(),
            vec![(
                10,
                "⚠️ The timer encountered an unexpected issue and has been stopped.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_failed_tick_loop_is_recovered_even_if_warning_fails() {
        let fixture = Fixture::new(RecordingNotifier::failing());
        let starter = Participant::new(1, "Starter");
        let snapshot = fixture
            .manager
            .start(&starter, &general(), 1, &ManualTick)
            .unwrap();

        let failed = tokio::spawn(failing_tick_loop());
        let notifier: Arc<dyn Notifier> = fixture.notifier.clone();
        supervise_tick_loop(
            fixture.manager.clone(),
            notifier,
            fixture.formatter.clone(),
            snapshot.session_id,
            failed,
        )
        .await;

        assert_eq!(fixture.manager.status().unwrap().is_idle(), true);
        assert_eq!(fixture.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_finished_tick_loop_needs_no_recovery() {
        let fixture = Fixture::new(RecordingNotifier::new());
        let starter = Participant::new(1, "Starter");
        let snapshot = fixture
            .manager
            .start(&starter, &general(), 1, &ManualTick)
            .unwrap();
        fixture.manager.stop(&starter, &general(), false).unwrap();

        let finished = tokio::spawn(finished_tick_loop());
        let notifier: Arc<dyn Notifier> = fixture.notifier.clone();
        supervise_tick_loop(
            fixture.manager.clone(),
            notifier,
            fixture.formatter.clone(),
            snapshot.session_id,
            finished,
        )
        .await;

        assert_eq!(fixture.notifier.sent().is_empty(), true);
    }

    async fn crashing_tick_loop() -> Result<()> {
        panic!("tick failure")
    }

    async fn failing_tick_loop() -> Result<()> {
        Err(Error::Mutex("poisoned".to_string()))
    }

    async fn finished_tick_loop() -> Result<()> {
        Ok(())
    }

    struct ManualTick;

    impl TickSchedule for ManualTick {
        fn schedule(&self, _session_id: Uuid) -> Result<TickHandle> {
            Ok(TickHandle::detached())
        }
    }
}
