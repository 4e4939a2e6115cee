pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod fields;
pub mod token;

pub use domain::expertise::{ExpertiseKey, ExpertiseRecord, ExpertiseUpdate, TeamId, UserId};
pub use errors::InterfaceError;
pub use fields::{parse_expertise_fields, ExpertiseFields, FieldValidationError};
pub use token::{TokenRejected, TokenVerifier};
