//! 领域层：角色、菜单、用户以及权限树解析

pub mod hierarchy;
pub mod menu;
pub mod permission;
pub mod repository;
pub mod role;
pub mod user;

pub use menu::{Menu, MenuDraft, MenuMeta, MenuNode};
pub use repository::{MenuRepository, RoleRepository, UserRepository};
pub use role::{Role, RoleDraft, RoleNode};
pub use user::{
    Email, HashedPassword, NewUser, Password, PasswordError, User, Username, email_taken,
    user_name_taken,
};
