pub mod cart;
pub mod customer;

pub use cart::{CartItem, CartSnapshot};
pub use customer::CustomerDetails;
