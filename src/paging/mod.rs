pub mod paginator;
pub mod payload;

pub use paginator::{paginate, PageStream, PayloadConverter};
pub use payload::CategoryEntry;
