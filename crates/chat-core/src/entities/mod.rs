//! Domain entities - core business objects

mod group;
mod message;
mod user;

pub use group::{ChatKind, Group};
pub use message::Message;
pub use user::User;
