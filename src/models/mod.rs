pub mod cache_record;
pub mod coordinate;
pub mod restaurant;
