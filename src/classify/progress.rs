use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(100);
const SLOW_AFTER: Duration = Duration::from_secs(60);

/// Spinner with elapsed time on stderr while a model call is in flight.
///
/// Holds no state the pipeline reads. `stop` joins the task; dropping the
/// ticker aborts it, so an early return cannot leave it drawing.
pub struct ProgressTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Starts drawing only when `enabled` and stderr is a terminal.
    pub fn start(label: &str, enabled: bool) -> Self {
        if !enabled || !std::io::stderr().is_terminal() {
            return Self {
                stop: Arc::new(AtomicBool::new(false)),
                handle: None,
            };
        }
        Self::spawn(label)
    }

    fn spawn(label: &str) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let label = label.to_string();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticks = 0usize;
            while !flag.load(Ordering::Relaxed) {
                let line = render_line(&label, SPINNER[ticks % SPINNER.len()], started.elapsed());
                let mut err = std::io::stderr();
                let _ = write!(err, "\r{}", line);
                let _ = err.flush();
                ticks += 1;
                tokio::time::sleep(TICK).await;
            }
            let _ = writeln!(std::io::stderr());
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub async fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn render_line(label: &str, frame: char, elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let mut line = format!("{} {} 已耗时: {:02}:{:02}", label, frame, secs / 60, secs % 60);
    if elapsed >= SLOW_AFTER {
        line.push_str(" ⚠️ 响应较慢...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_line() {
        assert_eq!(
            render_line("分类论文", '⠋', Duration::from_secs(75)),
            "分类论文 ⠋ 已耗时: 01:15 ⚠️ 响应较慢..."
        );
        assert_eq!(
            render_line("分类论文", '⠙', Duration::from_secs(5)),
            "分类论文 ⠙ 已耗时: 00:05"
        );
    }

    #[tokio::test]
    async fn test_running_ticker_joins_on_stop() {
        let ticker = ProgressTicker::spawn("分类论文");
        let task = ticker.handle.as_ref().unwrap().abort_handle();
        assert!(!task.is_finished());

        tokio::time::timeout(Duration::from_secs(5), ticker.stop())
            .await
            .expect("ticker did not stop");
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn test_dropped_ticker_is_aborted() {
        let ticker = ProgressTicker::spawn("分类论文");
        let flag = ticker.stop.clone();
        let task = ticker.handle.as_ref().unwrap().abort_handle();

        drop(ticker);
        assert!(flag.load(Ordering::Relaxed));
        for _ in 0..100 {
            if task.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn test_disabled_ticker_stops_immediately() {
        let ticker = ProgressTicker::start("x", false);
        assert!(ticker.handle.is_none());
        ticker.stop().await;
    }
}
