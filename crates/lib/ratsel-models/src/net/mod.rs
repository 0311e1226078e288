pub mod candidates;
pub mod profiles;
pub mod quality;
