pub mod post;

pub use post::{Author, Link, Media, PostRecord, API_TIMESTAMP_FORMAT};
