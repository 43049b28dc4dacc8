//! 流水线进度通知
//!
//! 每条进度消息都会写入日志，并同时转发给注入的 [`ProgressSink`]。
//! sink 的失败（如接收端已关闭）不会影响流水线本身。

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::stage_agent::Stage;

/// 一条进度消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub stage: Stage,
    pub message: String,
}

/// 进度消息接收方
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// 只写日志，不转发
#[derive(Debug, Default, Clone)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// 通过tokio通道把进度推给调用方（如前端推送、终端进度条）
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: &ProgressEvent) {
        // 接收端关闭后静默丢弃
        let _ = self.sender.send(event.clone());
    }
}

/// 绑定到一次运行的进度上报器
#[derive(Clone)]
pub struct ProgressReporter {
    run_id: Uuid,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressReporter {
    pub fn new(run_id: Uuid, sink: Arc<dyn ProgressSink>) -> Self {
        Self { run_id, sink }
    }

    pub fn emit(&self, stage: Stage, message: impl Into<String>) {
        let event = ProgressEvent {
            run_id: self.run_id,
            stage,
            message: message.into(),
        };
        info!(run_id = %event.run_id, stage = %event.stage, "{}", event.message);
        self.sink.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_channel_progress_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let run_id = Uuid::new_v4();
        let reporter = ProgressReporter::new(run_id, Arc::new(ChannelProgress::new(tx)));

        reporter.emit(Stage::Researcher, "Searching the web for top products...");

        let event = rx.try_recv().unwrap();
        assert_eq!(event.run_id, run_id);
        assert_eq!(event.stage, Stage::Researcher);
        assert_eq!(event.message, "Searching the web for top products...");
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let reporter = ProgressReporter::new(Uuid::new_v4(), Arc::new(ChannelProgress::new(tx)));

        // 不应panic
        reporter.emit(Stage::Complete, "Research complete!");
    }
}
