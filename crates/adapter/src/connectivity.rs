use domain::Collection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::flush::{FlushCoordinator, FlushReport};
use crate::traits::{ApiRequest, Method, Transport};

pub async fn probe(transport: &dyn Transport) -> bool {
    match transport
        .send(ApiRequest::new(Method::Head, Collection::Posts.path()))
        .await
    {
        Ok(resp) => resp.is_success(),
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct ConnectivityHandle {
    tx: mpsc::Sender<()>,
}

impl ConnectivityHandle {
    /// Ask the monitor to flush now. Returns `false` once the monitor has stopped.
    pub fn notify_online(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            // 已有一个待处理的信号，合并即可
            Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

pub struct ConnectivityMonitor {
    transport: Arc<dyn Transport>,
    flusher: Arc<FlushCoordinator>,
    interval: Duration,
    signals: mpsc::Receiver<()>,
}

impl ConnectivityMonitor {
    pub fn new(
        transport: Arc<dyn Transport>,
        flusher: Arc<FlushCoordinator>,
        interval: Duration,
    ) -> (Self, ConnectivityHandle) {
        let (tx, rx) = mpsc::channel(1);
        let monitor = Self {
            transport,
            flusher,
            interval,
            signals: rx,
        };
        (monitor, ConnectivityHandle { tx })
    }

    pub async fn run(mut self, cancel_token: CancellationToken) {
        info!(
            "Connectivity monitor started (probe every {:?})",
            self.interval
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reachable = false;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Connectivity monitor stopped");
                    break;
                }
                Some(()) = self.signals.recv() => {
                    info!("Online signal received, flushing queue");
                    log_report(self.flusher.flush().await);
                    // 记录当前状态，避免下一次探测再 flush 一遍
                    reachable = probe(self.transport.as_ref()).await;
                }
                _ = ticker.tick() => {
                    let now_reachable = probe(self.transport.as_ref()).await;
                    if now_reachable && !reachable {
                        info!("Server reachable, flushing queue");
                        log_report(self.flusher.flush().await);
                    } else if !now_reachable && reachable {
                        warn!("Server unreachable, writes will be queued");
                    }
                    reachable = now_reachable;
                }
            }
        }
    }
}

fn log_report(report: FlushReport) {
    if report.attempted > 0 {
        info!(
            "Flush finished: {}/{} delivered, {} still pending",
            report.delivered, report.attempted, report.remaining
        );
    }
}
