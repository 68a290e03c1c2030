pub mod cache;
pub mod html;
pub mod table;

pub use cache::FeedCache;
pub use table::Table;
