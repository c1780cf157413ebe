pub mod cache_repo;
pub mod key_value_store;
