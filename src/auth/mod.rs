// Authentication primitives: session tokens, password hashes and reset tokens

pub mod jwt;
pub mod password;
pub mod reset_token;
