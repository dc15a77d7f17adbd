//! 注册、登录与令牌认证

use std::sync::Arc;
use std::time::Duration;

use console_adapter_email::EmailSender;
use console_auth_core::{AuthContext, TokenService};
use console_common::{UserId, join_id_list};
use console_config::VerificationConfig;
use console_errors::{AppError, AppResult};
use console_ports::CachePort;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use super::commands::{LoginCommand, RegisterCommand, SendEmailCodeCommand};
use crate::domain::{
    Email, NewUser, Password, UserRepository, Username, email_taken, user_name_taken,
};
use crate::infrastructure::cache::{EmailCode, SessionStore, TokenStore};
use crate::infrastructure::captcha::{Captcha, CaptchaGenerator};

pub const VERIFICATION_TEMPLATE: &str = "verification_code.html";
const VERIFICATION_SUBJECT: &str = "Registration verification code";

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: SessionStore,
    tokens: TokenStore,
    token_service: Arc<TokenService>,
    email_sender: Arc<dyn EmailSender>,
    captcha: CaptchaGenerator,
    verification: VerificationConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn CachePort>,
        token_service: Arc<TokenService>,
        email_sender: Arc<dyn EmailSender>,
        captcha: CaptchaGenerator,
        captcha_ttl: Duration,
        verification: VerificationConfig,
    ) -> Self {
        let token_ttl = Duration::from_secs(token_service.expires_in().max(1) as u64);
        Self {
            users,
            sessions: SessionStore::new(
                cache.clone(),
                captcha_ttl,
                Duration::from_secs(verification.ttl_secs),
            ),
            tokens: TokenStore::new(cache, token_ttl),
            token_service,
            email_sender,
            captcha,
            verification,
        }
    }

    /// 生成新的图形验证码并写入客户端会话
    pub async fn issue_captcha(&self, sid: &str) -> AppResult<Captcha> {
        let captcha = self.captcha.generate();
        self.sessions.put_login_code(sid, &captcha.text).await?;
        Ok(captcha)
    }

    /// 发送注册邮箱验证码
    pub async fn send_email_code(&self, sid: &str, cmd: SendEmailCodeCommand) -> AppResult<()> {
        let user_name = Username::parse(&cmd.user_name).map_err(AppError::validation)?;
        let email = Email::new(&cmd.email).map_err(AppError::validation)?;
        self.ensure_available(&user_name, &email).await?;

        let code = generate_numeric_code(self.verification.code_length);
        self.sessions
            .put_email_code(
                sid,
                &EmailCode {
                    email: email.as_str().to_string(),
                    code: code.clone(),
                },
            )
            .await?;

        let context = serde_json::json!({
            "user_name": user_name.as_str(),
            "email": email.as_str(),
            "code": code,
            "expires_in_minutes": self.verification.ttl_secs.div_ceil(60),
        });
        self.email_sender
            .send_template_email(
                email.as_str(),
                VERIFICATION_SUBJECT,
                VERIFICATION_TEMPLATE,
                &context,
            )
            .await?;

        info!(user_name = %user_name.as_str(), email = %email, "Verification code sent");
        Ok(())
    }

    /// 注册新用户
    pub async fn register(&self, sid: &str, cmd: RegisterCommand) -> AppResult<UserId> {
        let user_name = Username::parse(&cmd.user_name).map_err(AppError::validation)?;
        let email = Email::new(&cmd.email).map_err(AppError::validation)?;
        let password = Password::new(cmd.password).map_err(|e| AppError::validation(e.to_string()))?;

        let expected = self
            .sessions
            .peek_email_code(sid)
            .await?
            .ok_or_else(|| AppError::validation("Verification code expired or not requested"))?;
        if expected.email != email.as_str() || expected.code != cmd.code.trim() {
            return Err(AppError::validation("Incorrect verification code"));
        }

        self.ensure_available(&user_name, &email).await?;

        let password_hash = password
            .hash()
            .map_err(|e| AppError::internal(e.to_string()))?;
        let user = self
            .users
            .create(&NewUser {
                user_name,
                email,
                password_hash,
            })
            .await?;

        self.sessions.clear_email_code(sid).await?;
        metrics::counter!("admin_register_total").increment(1);
        info!(user_id = %user.id, user_name = %user.user_name, "User registered");

        Ok(user.id)
    }

    /// 登录并签发令牌
    pub async fn login(&self, sid: &str, cmd: LoginCommand) -> AppResult<LoginResult> {
        let captcha_ok = self
            .sessions
            .take_login_code(sid)
            .await?
            .is_some_and(|expected| expected.eq_ignore_ascii_case(cmd.code.trim()));
        if !captcha_ok {
            record_login("bad_captcha");
            return Err(AppError::validation("Incorrect captcha"));
        }

        let Some(user) = self.users.find_by_user_name(cmd.user_name.trim()).await? else {
            record_login("unknown_user");
            return Err(AppError::not_found("User does not exist"));
        };

        let verified = user
            .password_hash
            .verify(&cmd.password)
            .map_err(|e| AppError::internal(e.to_string()))?;
        if !verified {
            record_login("bad_password");
            warn!(user_id = %user.id, "Login rejected: incorrect password");
            return Err(AppError::validation("Incorrect password"));
        }

        let scope = join_id_list(&user.role_ids);
        let token = self.token_service.generate_token(user.id, &scope)?;
        self.tokens.store(&token, user.id).await?;

        record_login("success");
        info!(user_id = %user.id, scope = %scope, "User logged in");
        Ok(LoginResult { token })
    }

    /// 注销令牌
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.tokens.revoke(token).await
    }

    /// 校验令牌：必须仍登记在缓存中，签名与有效期有效，且归属一致
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthContext> {
        let owner = self.tokens.lookup(token).await?.ok_or_else(|| {
            AppError::unauthenticated("Token revoked or not found, please log in again")
        })?;

        let claims = self.token_service.validate_token(token)?;
        if claims.user_id() != owner {
            return Err(AppError::unauthenticated("Token owner mismatch"));
        }

        Ok(AuthContext::from(&claims))
    }

    async fn ensure_available(&self, user_name: &Username, email: &Email) -> AppResult<()> {
        if self.users.exists_user_name(user_name.as_str()).await? {
            return Err(user_name_taken(user_name.as_str()));
        }
        if self.users.exists_email(email.as_str()).await? {
            return Err(email_taken(email.as_str()));
        }
        Ok(())
    }
}

fn record_login(result: &'static str) {
    metrics::counter!("admin_login_total", "result" => result).increment(1);
}

/// 生成定长数字验证码（左侧补零）
fn generate_numeric_code(length: usize) -> String {
    let length = length.clamp(1, 18);
    let upper = 10u64.pow(length as u32);
    let value = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", value, width = length)
}
