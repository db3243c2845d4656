pub mod clear;
pub mod completions;
pub mod current;
pub mod init;
pub mod plan;
pub mod read;
pub mod send;
