//! 集成测试公共设施：内存仓储、内存缓存、邮件桩和路由驱动

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use admin_service::api::{AppDependencies, AppState, router};
use admin_service::domain::{
    HashedPassword, Menu, MenuDraft, MenuRepository, NewUser, Role, RoleDraft, RoleRepository,
    User, UserRepository,
};
use admin_service::infrastructure::cache::SessionStore;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use chrono::Utc;
use console_adapter_email::EmailSender;
use console_auth_core::TokenService;
use console_common::{MenuId, Pagination, RoleId, UserId};
use console_config::{CaptchaConfig, VerificationConfig};
use console_errors::{AppError, AppResult};
use console_ports::CachePort;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tower::ServiceExt;

pub const SID: &str = "test-session";
pub const JWT_SECRET: &str = "integration-test-secret";
pub const ISSUER: &str = "console-admin";

fn page<T: Clone>(items: &[T], pagination: &Pagination) -> (Vec<T>, u64) {
    let page = items
        .iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
        .cloned()
        .collect();
    (page, items.len() as u64)
}

// ---------------------------------------------------------------------------
// 缓存
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCache {
    data: Mutex<HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn value(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.data.lock().remove(key);
    }
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> AppResult<()> {
        self.put(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.data.lock().contains_key(key))
    }

    async fn get_del(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.data.lock().remove(key))
    }
}

// ---------------------------------------------------------------------------
// 邮件
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub template: String,
    pub context: Value,
}

#[derive(Default)]
pub struct MockEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
}

impl MockEmailSender {
    pub fn last(&self) -> Option<SentEmail> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send_text_email(&self, to: &str, _subject: &str, body: &str) -> AppResult<()> {
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            template: String::new(),
            context: Value::String(body.to_string()),
        });
        Ok(())
    }

    async fn send_template_email(
        &self,
        to: &str,
        _subject: &str,
        template_name: &str,
        context: &Value,
    ) -> AppResult<()> {
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            template: template_name.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 仓储
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUsers {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUsers {
    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_user_name(&self, user_name: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.user_name == user_name && !u.deleted)
            .cloned())
    }

    async fn exists_user_name(&self, user_name: &str) -> AppResult<bool> {
        Ok(self.users.read().iter().any(|u| u.user_name == user_name))
    }

    async fn exists_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.users.read().iter().any(|u| u.email == email))
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let created = User {
            id: UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            user_name: user.user_name.as_str().to_string(),
            password_hash: user.password_hash.clone(),
            email: user.email.as_str().to_string(),
            role_ids: Vec::new(),
            info: serde_json::json!({}),
            deleted: false,
            created_at: Utc::now(),
        };
        self.users.write().push(created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write();
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id && !u.deleted)
            .ok_or_else(|| AppError::not_found("user"))?;
        *existing = user.clone();
        Ok(())
    }

    async fn soft_delete(&self, id: UserId) -> AppResult<bool> {
        let mut users = self.users.write();
        match users.iter_mut().find(|u| u.id == id && !u.deleted) {
            Some(user) => {
                user.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<User>, u64)> {
        let active: Vec<User> = self
            .users
            .read()
            .iter()
            .filter(|u| !u.deleted)
            .cloned()
            .collect();
        Ok(page(active.as_slice(), pagination))
    }
}

#[derive(Default)]
pub struct InMemoryRoles {
    roles: RwLock<Vec<Role>>,
    next_id: AtomicI64,
}

impl InMemoryRoles {
    /// 直接写入指定 id 的角色
    pub fn insert(&self, role: Role) {
        self.next_id.fetch_max(role.id.0, Ordering::SeqCst);
        self.roles.write().push(role);
    }

    pub fn get(&self, id: RoleId) -> Option<Role> {
        self.roles.read().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoles {
    async fn list_all(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.read().clone())
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Role>, u64)> {
        Ok(page(self.roles.read().as_slice(), pagination))
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.get(id))
    }

    async fn create(&self, draft: &RoleDraft) -> AppResult<Role> {
        let id = RoleId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let role = draft.clone().into_role(id);
        self.roles.write().push(role.clone());
        Ok(role)
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write();
        let existing = roles
            .iter_mut()
            .find(|r| r.id == role.id)
            .ok_or_else(|| AppError::not_found("role"))?;
        *existing = role.clone();
        Ok(())
    }

    async fn delete(&self, id: RoleId) -> AppResult<()> {
        self.roles.write().retain(|r| r.id != id);
        Ok(())
    }

    async fn has_children(&self, id: RoleId) -> AppResult<bool> {
        Ok(self.roles.read().iter().any(|r| r.parent_id == id))
    }
}

#[derive(Default)]
pub struct InMemoryMenus {
    menus: RwLock<Vec<Menu>>,
    next_id: AtomicI64,
}

impl InMemoryMenus {
    pub fn insert(&self, menu: Menu) {
        self.next_id.fetch_max(menu.id.0, Ordering::SeqCst);
        self.menus.write().push(menu);
    }

    pub fn get(&self, id: MenuId) -> Option<Menu> {
        self.menus.read().iter().find(|m| m.id == id).cloned()
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenus {
    async fn list_all(&self) -> AppResult<Vec<Menu>> {
        Ok(self.menus.read().clone())
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<(Vec<Menu>, u64)> {
        Ok(page(self.menus.read().as_slice(), pagination))
    }

    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>> {
        Ok(self
            .menus
            .read()
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: MenuId) -> AppResult<Option<Menu>> {
        Ok(self.get(id))
    }

    async fn create(&self, draft: &MenuDraft) -> AppResult<Menu> {
        let id = MenuId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let menu = draft.clone().into_menu(id);
        self.menus.write().push(menu.clone());
        Ok(menu)
    }

    async fn update(&self, menu: &Menu) -> AppResult<()> {
        let mut menus = self.menus.write();
        let existing = menus
            .iter_mut()
            .find(|m| m.id == menu.id)
            .ok_or_else(|| AppError::not_found("menu"))?;
        *existing = menu.clone();
        Ok(())
    }

    async fn delete(&self, id: MenuId) -> AppResult<()> {
        self.menus.write().retain(|m| m.id != id);
        Ok(())
    }

    async fn has_children(&self, id: MenuId) -> AppResult<bool> {
        Ok(self.menus.read().iter().any(|m| m.parent_id == id))
    }
}

// ---------------------------------------------------------------------------
// 测试应用
// ---------------------------------------------------------------------------

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct TestApp {
    pub router: Router,
    pub cache: Arc<InMemoryCache>,
    pub email: Arc<MockEmailSender>,
    pub users: Arc<InMemoryUsers>,
    pub roles: Arc<InMemoryRoles>,
    pub menus: Arc<InMemoryMenus>,
    pub token_service: Arc<TokenService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_token_service(TokenService::new(JWT_SECRET, 3600, ISSUER))
    }

    pub fn with_token_service(token_service: TokenService) -> Self {
        let cache = Arc::new(InMemoryCache::default());
        let email = Arc::new(MockEmailSender::default());
        let users = Arc::new(InMemoryUsers::default());
        let roles = Arc::new(InMemoryRoles::default());
        let menus = Arc::new(InMemoryMenus::default());
        let token_service = Arc::new(token_service);

        let state = AppState::new(AppDependencies {
            users: users.clone(),
            roles: roles.clone(),
            menus: menus.clone(),
            cache: cache.clone(),
            token_service: token_service.clone(),
            email_sender: email.clone(),
            captcha: CaptchaConfig::default(),
            verification: VerificationConfig::default(),
        })
        .expect("app state");

        Self {
            router: router(state),
            cache,
            email,
            users,
            roles,
            menus,
            token_service,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("authorization", value)])
            .unwrap_or_default();
        self.send(Method::GET, uri, &headers, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let mut headers: Vec<(&str, &str)> = vec![("x-session-id", SID)];
        if let Some(value) = auth.as_deref() {
            headers.push(("authorization", value));
        }
        self.send(Method::POST, uri, &headers, Some(body)).await
    }

    /// 申请图形验证码并从缓存读出文本
    pub async fn captcha(&self) -> String {
        let response = self
            .send(Method::GET, "/api/getCode", &[("x-session-id", SID)], None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        self.cache
            .value(&SessionStore::login_code_key(SID))
            .expect("captcha stored")
    }

    /// 直接写入一个用户
    pub fn seed_user(&self, user_name: &str, password: &str, role_ids: &[i64]) -> UserId {
        let id = UserId(self.users.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.users.users.write().push(User {
            id,
            user_name: user_name.to_string(),
            password_hash: HashedPassword::from_plain(password).expect("hash"),
            email: format!("{}@example.com", user_name),
            role_ids: role_ids.iter().copied().map(RoleId).collect(),
            info: serde_json::json!({}),
            deleted: false,
            created_at: Utc::now(),
        });
        id
    }

    /// 走完整的验证码 + 登录流程，返回令牌
    pub async fn login(&self, user_name: &str, password: &str) -> String {
        let code = self.captcha().await;
        let response = self
            .post(
                "/api/login",
                None,
                serde_json::json!({"userName": user_name, "password": password, "code": code}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()["data"]["token"]
            .as_str()
            .expect("token")
            .to_string()
    }
}

pub fn role(id: i64, parent: i64, menus: &[i64]) -> Role {
    Role::new(
        RoleId(id),
        RoleId(parent),
        format!("role-{}", id),
        menus.iter().copied().map(MenuId).collect(),
    )
}

pub fn menu(id: i64, parent: i64, serial: i32) -> Menu {
    Menu::new(MenuId(id), MenuId(parent), format!("menu-{}", id), serial)
}
