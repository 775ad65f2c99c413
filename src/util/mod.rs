pub mod format;

pub use format::{fmt_date, fmt_size, strip_trailing};
