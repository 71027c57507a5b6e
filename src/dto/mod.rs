pub mod auth_dto;
pub mod common_dto;
pub mod diligence_dto;
pub mod user_dto;
