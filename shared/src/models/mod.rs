//! Domain models shared across the workspace

mod category;
mod order;
mod photo;

pub use category::{Category, CategoryCreate};
pub use order::{Order, OrderCreate, OrderStatus};
pub use photo::{Photo, PhotoUpdate};
