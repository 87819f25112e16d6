pub mod response_cache;
