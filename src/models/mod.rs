pub mod diligence;
pub mod profile;
pub mod user;
