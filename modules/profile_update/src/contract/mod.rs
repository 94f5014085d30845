pub mod client;
pub mod error;
pub mod model;

pub use error::{FieldError, ProfileError, ValidationErrors};
pub use model::{AdditionalFields, NewUser, ProfilePatch, User};
