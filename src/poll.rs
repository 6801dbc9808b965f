//! 轮询数据加载器
//!
//! 激活时立即拉取一次，此后按固定周期拉取。每次拉取带递增序号，
//! 完成顺序与发起顺序不一致时丢弃较旧的结果（latest-request-wins）。
//! 停用后不会再有任何结果被应用。
//!
//! 加载器与运行时无关：`sleep` 由调用方提供（浏览器端为 `gloo-timers`，
//! 测试中为 `tokio::time::sleep`），返回的任务也由调用方负责 spawn。

use std::future::Future;
use std::ops::ControlFlow;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{self, AbortHandle, LocalBoxFuture};
use futures::stream::{self, Stream};
use futures::task::AtomicWaker;
use futures::{FutureExt, StreamExt};
use log::{debug, trace};

/// 同时在途的拉取请求上限
pub const MAX_IN_FLIGHT: usize = 4;

// =========================================================
// 共享状态与句柄
// =========================================================

#[derive(Debug)]
struct PollState {
    active: AtomicBool,
    refresh: AtomicBool,
    waker: AtomicWaker,
}

impl PollState {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn stop(&self) {
        self.active.store(false, Ordering::Release);
        self.waker.wake();
    }
}

/// 轮询订阅句柄
///
/// 丢弃句柄即停用；停用对所有退出路径都成立。
#[derive(Debug)]
pub struct PollHandle {
    state: Arc<PollState>,
    abort: AbortHandle,
}

impl PollHandle {
    /// 立即发起一次计划外的拉取
    pub fn refresh(&self) {
        if self.state.is_active() {
            self.state.refresh.store(true, Ordering::Release);
            self.state.waker.wake();
        }
    }

    pub fn deactivate(&self) {
        if self.state.is_active() {
            trace!("poll deactivated");
        }
        self.state.stop();
        self.abort.abort();
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// =========================================================
// 触发源
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Activation,
    Tick,
    Refresh,
}

/// `PollHandle::refresh` 产生的触发流
struct RefreshRequests {
    state: Arc<PollState>,
}

impl Stream for RefreshRequests {
    type Item = Trigger;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Trigger>> {
        self.state.waker.register(cx.waker());
        if self.state.refresh.swap(false, Ordering::AcqRel) {
            Poll::Ready(Some(Trigger::Refresh))
        } else {
            Poll::Pending
        }
    }
}

// =========================================================
// 加载器
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingLoader {
    period: Duration,
}

impl PollingLoader {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 激活轮询
    ///
    /// `apply` 返回 `Break` 时轮询结束（例如会话失效、好友不存在）。
    /// 返回的任务必须被 spawn 到调用方的执行器上才会运行。
    pub fn activate<Sl, SlFut, F, Fut, T, E, A>(
        &self,
        sleep: Sl,
        mut fetch: F,
        mut apply: A,
    ) -> (PollHandle, LocalBoxFuture<'static, ()>)
    where
        Sl: Fn(Duration) -> SlFut + 'static,
        SlFut: Future<Output = ()> + 'static,
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        A: FnMut(Result<T, E>) -> ControlFlow<()> + 'static,
        T: 'static,
        E: 'static,
    {
        let period = self.period;
        let state = Arc::new(PollState {
            active: AtomicBool::new(true),
            refresh: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        });

        let ticks = stream::unfold(sleep, move |sleep| async move {
            sleep(period).await;
            Some((Trigger::Tick, sleep))
        });
        let refreshes = RefreshRequests {
            state: state.clone(),
        };
        // 激活时的拉取总是先于第一次周期拉取
        let triggers = stream::once(future::ready(Trigger::Activation))
            .chain(stream::select(ticks, refreshes));

        let mut next_seq = 0u64;
        let fetches = triggers.map(move |trigger| {
            next_seq += 1;
            let seq = next_seq;
            trace!("poll #{} ({:?})", seq, trigger);
            let pending = fetch();
            async move { (seq, pending.await) }
        });

        let task_state = state.clone();
        let task = async move {
            let mut results = pin!(fetches.buffer_unordered(MAX_IN_FLIGHT));
            let mut newest_applied = 0u64;

            while let Some((seq, result)) = results.next().await {
                if !task_state.is_active() {
                    break;
                }
                if seq < newest_applied {
                    debug!("discarding stale poll result #{} (newest #{})", seq, newest_applied);
                    continue;
                }
                newest_applied = seq;
                if apply(result).is_break() {
                    debug!("poll stopped by consumer at #{}", seq);
                    task_state.stop();
                    break;
                }
            }
        };

        let (task, abort) = future::abortable(task);
        let handle = PollHandle { state, abort };
        (handle, task.map(|_| ()).boxed_local())
    }
}

#[cfg(test)]
mod tests;
