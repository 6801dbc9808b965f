use super::*;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::task::LocalSet;
use tokio::time::sleep;

const PERIOD: Duration = Duration::from_secs(5);

// =========================================================
// 辅助函数
// =========================================================

/// 记录拉取次数与被应用的结果
#[derive(Clone, Default)]
struct Probe {
    fetched: Rc<Cell<u32>>,
    applied: Rc<RefCell<Vec<Result<u32, String>>>>,
}

impl Probe {
    fn fetched(&self) -> u32 {
        self.fetched.get()
    }

    fn applied(&self) -> Vec<Result<u32, String>> {
        self.applied.borrow().clone()
    }

    /// 第 n 次拉取返回 `Ok(n)`，耗时取自 `delays`（用尽后为 0）
    fn fetcher(
        &self,
        delays: Vec<Duration>,
    ) -> impl FnMut() -> LocalBoxFuture<'static, Result<u32, String>> + 'static {
        let fetched = self.fetched.clone();
        let mut delays = VecDeque::from(delays);
        move || {
            fetched.set(fetched.get() + 1);
            let n = fetched.get();
            let delay = delays.pop_front().unwrap_or_default();
            async move {
                sleep(delay).await;
                Ok(n)
            }
            .boxed_local()
        }
    }

    fn recorder(&self) -> impl FnMut(Result<u32, String>) -> ControlFlow<()> + 'static {
        let applied = self.applied.clone();
        move |result| {
            applied.borrow_mut().push(result);
            ControlFlow::Continue(())
        }
    }
}

fn start(
    probe: &Probe,
    delays: Vec<Duration>,
) -> PollHandle {
    let (handle, task) =
        PollingLoader::new(PERIOD).activate(sleep, probe.fetcher(delays), probe.recorder());
    tokio::task::spawn_local(task);
    handle
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

// =========================================================
// 调度
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_immediate_fetch_then_periodic() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let _handle = start(&probe, vec![]);

            sleep(secs(0.1)).await;
            assert_eq!(probe.fetched(), 1);
            assert_eq!(probe.applied(), vec![Ok(1)]);

            sleep(secs(12.4)).await;
            assert_eq!(probe.fetched(), 3);
            assert_eq!(probe.applied(), vec![Ok(1), Ok(2), Ok(3)]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_nothing_runs_until_spawned() {
    let probe = Probe::default();
    let (handle, _task) =
        PollingLoader::new(PERIOD).activate(sleep, probe.fetcher(vec![]), probe.recorder());

    sleep(secs(11.0)).await;
    assert_eq!(probe.fetched(), 0);
    assert!(handle.is_active());
}

// =========================================================
// 停用
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_no_apply_after_deactivation() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let handle = start(&probe, vec![secs(3.0)]);

            sleep(secs(1.0)).await;
            assert_eq!(probe.fetched(), 1);
            handle.deactivate();
            assert!(!handle.is_active());

            // 在途请求本应在 t=3 完成，下一次计划拉取在 t=5
            sleep(secs(20.0)).await;
            assert_eq!(probe.fetched(), 1);
            assert!(probe.applied().is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_loop() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let handle = start(&probe, vec![]);

            sleep(secs(6.0)).await;
            assert_eq!(probe.fetched(), 2);
            drop(handle);

            sleep(secs(30.0)).await;
            assert_eq!(probe.fetched(), 2);
            assert_eq!(probe.applied().len(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_refresh_after_deactivation_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let handle = start(&probe, vec![]);
            sleep(secs(0.1)).await;

            handle.deactivate();
            handle.refresh();
            sleep(secs(1.0)).await;
            assert_eq!(probe.fetched(), 1);
        })
        .await;
}

// =========================================================
// 错误与终止
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_errors_do_not_stop_polling() {
    LocalSet::new()
        .run_until(async {
            let count = Rc::new(Cell::new(0u32));
            let applied = Rc::new(RefCell::new(Vec::new()));

            let fetch = {
                let count = count.clone();
                move || {
                    count.set(count.get() + 1);
                    let n = count.get();
                    async move {
                        if n == 1 {
                            Err("Network Error".to_string())
                        } else {
                            Ok(n)
                        }
                    }
                }
            };
            let apply = {
                let applied = applied.clone();
                move |result: Result<u32, String>| {
                    applied.borrow_mut().push(result);
                    ControlFlow::Continue(())
                }
            };

            let (_handle, task) = PollingLoader::new(PERIOD).activate(sleep, fetch, apply);
            tokio::task::spawn_local(task);

            sleep(secs(5.5)).await;
            assert_eq!(
                *applied.borrow(),
                vec![Err("Network Error".to_string()), Ok(2)]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_break_ends_loop() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let applied = probe.applied.clone();
            let apply = move |result: Result<u32, String>| {
                let stop = result == Ok(2);
                applied.borrow_mut().push(result);
                if stop {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            };

            let (handle, task) =
                PollingLoader::new(PERIOD).activate(sleep, probe.fetcher(vec![]), apply);
            tokio::task::spawn_local(task);

            sleep(secs(30.0)).await;
            assert_eq!(probe.fetched(), 2);
            assert_eq!(probe.applied(), vec![Ok(1), Ok(2)]);
            assert!(!handle.is_active());
        })
        .await;
}

// =========================================================
// 刷新与乱序
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_fetches_immediately() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let handle = start(&probe, vec![]);

            sleep(secs(1.0)).await;
            handle.refresh();
            sleep(secs(0.1)).await;
            assert_eq!(probe.fetched(), 2);

            // 刷新不改变周期节奏
            sleep(secs(4.0)).await;
            assert_eq!(probe.fetched(), 3);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_is_discarded() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            // #1 在 t=0 发起耗时 7s，#2 在 t=5 发起耗时 1s
            let _handle = start(&probe, vec![secs(7.0), secs(1.0)]);

            sleep(secs(6.5)).await;
            assert_eq!(probe.applied(), vec![Ok(2)]);

            sleep(secs(2.0)).await;
            assert_eq!(probe.fetched(), 2);
            assert_eq!(probe.applied(), vec![Ok(2)]);

            sleep(secs(2.0)).await;
            assert_eq!(probe.applied(), vec![Ok(2), Ok(3)]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_fetches_are_bounded() {
    LocalSet::new()
        .run_until(async {
            let probe = Probe::default();
            let slow = vec![secs(60.0); 10];
            let _handle = start(&probe, slow);

            sleep(secs(40.0)).await;
            assert_eq!(probe.fetched() as usize, MAX_IN_FLIGHT);
            assert!(probe.applied().is_empty());
        })
        .await;
}

#[test]
fn test_handle_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PollHandle>();
}
