pub mod chat;
pub mod index_route;
