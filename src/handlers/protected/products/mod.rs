mod filter;
mod list;

pub use filter::filter_by_name;
pub use list::index;
