pub mod import;
pub mod metrics;
pub mod post;
pub mod recompute;
pub mod user;

pub use import::{ImportRow, NewImport};
pub use metrics::{MetricsSnapshotRow, NewSnapshot};
pub use post::{NewPost, PostRow};
pub use recompute::{RecomputeRunRow, RecomputeStatus};
pub use user::UserRow;
