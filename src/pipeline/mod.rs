//! Release pipeline: build, validate, smoke test, select version, publish
//!
//! ```text
//! Clean -> Built -> Validated -> SmokeTested -> VersionSelected -> Published
//!                                                               \-> DryRunComplete
//! (any state) -> Aborted(error kind)
//! ```

pub mod orchestrator;
pub mod publisher;
pub mod state;

pub use orchestrator::{
    require_token, resolve_token, select_version, PipelineOptions, ReleasePipeline,
};
pub use publisher::{HttpPublisher, MockPublisher, Publisher};
pub use state::{PipelineReport, PipelineState};
