//! User management module.
//!
//! Provides user persistence, validation and role management.

mod models;
mod repository;
mod service;

pub use models::{
    CreateUserRequest, NewUser, SetEnabledRequest, SetRolesRequest, UpdateUserRequest, User,
    UserInfo, UserListQuery,
};
pub use repository::UserRepository;
pub use service::{MIN_PASSWORD_LENGTH, UserService};
