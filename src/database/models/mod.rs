pub mod client;
pub mod project;
pub mod user;

pub use client::{Client, ClientChanges, NewClient};
pub use project::{NewProject, Project, ProjectChanges};
pub use user::User;
