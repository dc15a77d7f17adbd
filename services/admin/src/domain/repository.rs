//! 仓储接口

use async_trait::async_trait;
use console_common::{MenuId, Pagination, RoleId, UserId};
use console_errors::AppResult;

use super::menu::{Menu, MenuDraft};
use super::role::{Role, RoleDraft};
use super::user::{NewUser, User};

/// 角色仓储接口
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// 全部角色（按 id 升序）
    async fn list_all(&self) -> AppResult<Vec<Role>>;

    /// 分页列出角色
    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Role>, u64)>;

    /// 根据 ID 查找角色
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// 创建角色，返回分配了 id 的记录
    async fn create(&self, draft: &RoleDraft) -> AppResult<Role>;

    /// 更新角色
    async fn update(&self, role: &Role) -> AppResult<()>;

    /// 删除角色
    async fn delete(&self, id: RoleId) -> AppResult<()>;

    /// 是否存在以该角色为父的角色
    async fn has_children(&self, id: RoleId) -> AppResult<bool>;
}

/// 菜单仓储接口
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// 全部菜单（按 id 升序）
    async fn list_all(&self) -> AppResult<Vec<Menu>>;

    /// 分页列出菜单
    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Menu>, u64)>;

    /// 按 id 列表查找菜单，不存在的 id 被忽略
    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>>;

    /// 根据 ID 查找菜单
    async fn find_by_id(&self, id: MenuId) -> AppResult<Option<Menu>>;

    /// 创建菜单
    async fn create(&self, draft: &MenuDraft) -> AppResult<Menu>;

    /// 更新菜单
    async fn update(&self, menu: &Menu) -> AppResult<()>;

    /// 删除菜单
    async fn delete(&self, id: MenuId) -> AppResult<()>;

    /// 是否存在子菜单
    async fn has_children(&self, id: MenuId) -> AppResult<bool>;
}

/// 用户仓储接口
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户（包含已删除）
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// 根据用户名查找未删除的用户
    async fn find_by_user_name(&self, user_name: &str) -> AppResult<Option<User>>;

    /// 用户名是否已被占用（包含已删除用户）
    async fn exists_user_name(&self, user_name: &str) -> AppResult<bool>;

    /// 邮箱是否已被占用（包含已删除用户）
    async fn exists_email(&self, email: &str) -> AppResult<bool>;

    /// 创建用户
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// 更新邮箱、角色和资料
    async fn update(&self, user: &User) -> AppResult<()>;

    /// 软删除，返回是否有记录被修改
    async fn soft_delete(&self, id: UserId) -> AppResult<bool>;

    /// 分页列出未删除的用户
    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<User>, u64)>;
}
