pub mod pagecache;
pub mod pagination;
pub mod response;
pub mod sessionauth;
