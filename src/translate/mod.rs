pub mod client;
pub mod interface;
