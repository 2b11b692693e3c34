pub mod config;
pub mod exclude;
pub mod page;
pub mod search;
pub mod storage;
pub mod tags;
pub mod types;
