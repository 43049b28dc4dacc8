//! 购物调研流水线
//!
//! 固定顺序：Manager -> Researcher -> Specialist -> ImageSearch -> PriceComparison -> Formatter，
//! 每个阶段读取并补充同一个 [`state::ShoppingState`]。

use thiserror::Error;

pub mod agents;
pub mod context;
pub mod normalize;
pub mod progress;
pub mod stage_agent;
pub mod state;
pub mod workflow;

pub use context::PipelineContext;
pub use progress::{ChannelProgress, NullProgress, ProgressEvent, ProgressSink};
pub use stage_agent::Stage;
pub use state::ShoppingState;
pub use workflow::ShoppingPipeline;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("the shopping query is empty")]
    EmptyQuery,
    #[error("the pipeline finished without a final response")]
    MissingResponse,
}
