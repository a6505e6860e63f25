pub mod coordinator;
pub mod error;
pub mod types;
pub mod uci;
pub mod worker;

pub use coordinator::*;
pub use error::*;
pub use types::*;
pub use uci::{UciEngine, UciProcess, DEFAULT_RESPONSE_TIMEOUT};
pub use worker::{SearchWorker, WorkerEvent};
