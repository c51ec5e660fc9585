pub mod controller;
pub mod messages;

pub use controller::{
    ActionResult, ErrorKind, Progress, UserError, WorkflowController, VIDEO_POLL_INTERVAL,
};
