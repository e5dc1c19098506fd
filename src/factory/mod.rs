pub mod skill;
pub mod user;
pub mod user_profile;
