pub mod bucket;
pub mod device;
