pub mod account;
pub mod certificate;
pub mod contact;
pub mod profile;
pub mod project;
