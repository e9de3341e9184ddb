pub mod catalog;
pub mod password;
