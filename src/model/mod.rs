pub mod contact;
pub mod education;
pub mod experience;
pub mod skill;
pub mod user;
pub mod user_profile;
