// Library for tests to access modules

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod packet_repo;
pub mod snapshot_repo;
pub mod snapshot_worker;
