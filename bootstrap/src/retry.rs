//! 启动阶段的指数退避重试
//!
//! 只用于建立 PostgreSQL / Redis 连接，请求路径上的调用不重试。

use std::future::Future;
use std::time::Duration;

use console_config::StartupConfig;
use tracing::{info, warn};

/// 退避计划：第 n 次失败后等待 `initial * 2^n`，不超过 `max`
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    attempts: u32,
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial,
            max,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl From<&StartupConfig> for Backoff {
    fn from(cfg: &StartupConfig) -> Self {
        Self::new(
            cfg.connect_attempts,
            Duration::from_millis(cfg.initial_backoff_ms),
            Duration::from_millis(cfg.max_backoff_ms),
        )
    }
}

/// 反复执行 `connect` 直到成功或次数用尽，失败时返回最后一次的错误
pub async fn connect_with_backoff<F, Fut, T, E>(
    backoff: Backoff,
    target: &str,
    mut connect: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut failures = 0;
    loop {
        let err = match connect().await {
            Ok(value) => {
                if failures > 0 {
                    info!(target_name = target, failures, "Connected after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        failures += 1;
        if failures >= backoff.attempts() {
            warn!(target_name = target, failures, error = %err, "Giving up connecting");
            return Err(err);
        }

        let delay = backoff.delay(failures - 1);
        warn!(
            target_name = target,
            failures,
            error = %err,
            delay_ms = delay.as_millis() as u64,
            "Connection failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(attempts: u32) -> Backoff {
        Backoff::new(attempts, Duration::from_millis(1), Duration::from_millis(4))
    }

    #[tokio::test]
    async fn test_recovers_after_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, String> = connect_with_backoff(quick(3), "db", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("refused #{}", n))
                } else {
                    Ok("connected")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = connect_with_backoff(quick(2), "redis", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("refused #{}", n)) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "refused #1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = connect_with_backoff(quick(0), "db", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles_up_to_cap() {
        let backoff = Backoff::from(&StartupConfig::default());
        assert_eq!(backoff.attempts(), 5);
        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(5), Duration::from_secs(30));
        assert_eq!(backoff.delay(40), Duration::from_secs(30));
    }
}
