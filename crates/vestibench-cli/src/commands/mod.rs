pub mod answer;
pub mod compare;
pub mod extract;
pub mod init;
pub mod list_models;
pub mod score;
pub mod validate;
