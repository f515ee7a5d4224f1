use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// 进度回调：消息 + 完成百分比（0-100）
pub type ProgressReporter = dyn Fn(&str, u8) + Send + Sync;

/// 进度句柄
///
/// 核心不依赖任何渲染界面，只通过回调上报进度。上报的百分比保证
/// 单调不减：并行子任务完成顺序不定时，落后的上报会被钳制到当前值。
#[derive(Clone)]
pub struct ProgressHandle {
    reporter: Arc<ProgressReporter>,
    last: Arc<AtomicU8>,
}

impl ProgressHandle {
    pub fn new(reporter: Arc<ProgressReporter>) -> Self {
        Self {
            reporter,
            last: Arc::new(AtomicU8::new(0)),
        }
    }

    /// 默认进度输出，打印到标准输出
    pub fn stdout() -> Self {
        Self::new(Arc::new(|message: &str, percent: u8| {
            println!("⏳ [{percent:>3}%] {message}");
        }))
    }

    /// 静默句柄
    pub fn silent() -> Self {
        Self::new(Arc::new(|_: &str, _: u8| {}))
    }

    /// 上报进度。百分比超过100时按100处理，低于已上报值时钳制到已上报值
    pub fn report(&self, message: &str, percent: u8) {
        let percent = percent.min(100);
        let clamped = self.last.fetch_max(percent, Ordering::SeqCst).max(percent);
        (self.reporter)(message, clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_handle() -> (ProgressHandle, Arc<Mutex<Vec<(String, u8)>>>) {
        let record: Arc<Mutex<Vec<(String, u8)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = record.clone();
        let handle = ProgressHandle::new(Arc::new(move |message: &str, percent: u8| {
            sink.lock().unwrap().push((message.to_string(), percent));
        }));
        (handle, record)
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (handle, record) = recording_handle();
        handle.report("start", 10);
        handle.report("late arrival", 5);
        handle.report("done", 100);

        let percents: Vec<u8> = record.lock().unwrap().iter().map(|(_, p)| *p).collect();
        assert_eq!(percents, vec![10, 10, 100]);
    }

    #[test]
    fn test_progress_capped_at_100() {
        let (handle, record) = recording_handle();
        handle.report("overflow", 250);
        assert_eq!(record.lock().unwrap()[0].1, 100);
    }
}
