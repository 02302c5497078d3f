pub mod error;
pub mod models;
pub mod service;

pub use error::{MemberError, Result};
pub use models::{AuthType, Member, Profile};
pub use service::MemberService;
