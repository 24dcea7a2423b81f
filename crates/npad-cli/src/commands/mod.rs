pub mod add;
pub mod attach;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod show;
