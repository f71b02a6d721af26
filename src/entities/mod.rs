//! Entities module - contains all stored documents and their request payloads

pub mod cart;
pub mod contact;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, NewCart};
pub use contact::{ContactMessage, NewContactMessage};
pub use order::{AddressInfo, LineItem, NewOrder, Order};
pub use product::{NewProduct, Product};
