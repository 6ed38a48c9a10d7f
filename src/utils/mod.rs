pub mod code_cache;
pub mod code_filter;
