pub mod cache;
pub mod client;
pub mod color;
pub mod convert;
