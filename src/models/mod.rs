pub mod document;
pub mod ticket;
