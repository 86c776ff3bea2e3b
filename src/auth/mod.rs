pub mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
