mod refresh;
mod stream;
mod task;

pub use refresh::RefreshParams;
pub use stream::{
    FRAME_TASK_STATUS, FRAME_WALLET_POINTS, StreamEvent, StreamFrame, TaskStatusPayload,
    WalletPointsPayload,
};
pub use task::{Task, TaskPage, TaskQuery, TaskStatus};
