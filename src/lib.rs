pub mod account;
pub mod card;
pub mod cli;
pub mod config;
pub mod error;
pub mod node;
pub mod rpc;
pub mod seed;
pub mod storage;
