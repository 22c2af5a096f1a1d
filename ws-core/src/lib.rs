pub mod error;
pub mod output_macros;
pub mod table;

pub use error::{Result, WsError};
pub use table::{render_table, NO_RESULTS};

/// Maximum number of workspace IDs the WorkSpaces API accepts in one batched call.
pub const BATCH_SIZE: usize = 25;
