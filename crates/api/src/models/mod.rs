//! Domain models for the API.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Category, Product, Slider};
pub use order::{Order, OrderItem, OrderItemDetail};
pub use user::User;
