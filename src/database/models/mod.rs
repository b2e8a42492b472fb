pub mod product;
pub mod user;

pub use product::{Product, ProductProperty, ProductWithProps};
pub use user::User;
