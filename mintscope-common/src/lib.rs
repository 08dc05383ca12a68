pub mod dto;
pub mod models;
pub mod storage;
pub mod traits;
