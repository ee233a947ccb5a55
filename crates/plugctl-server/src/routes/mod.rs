pub mod access;
pub mod health;
pub mod logs;
pub mod trigger;
