pub mod blockchain;
pub mod health;
