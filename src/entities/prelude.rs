pub use super::accounts::Entity as Accounts;
pub use super::certificates::Entity as Certificates;
pub use super::contact_messages::Entity as ContactMessages;
pub use super::profile::Entity as Profile;
pub use super::projects::Entity as Projects;
