//! 邮件模板系统

use console_errors::{AppError, AppResult};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从目录加载 `*.html` 模板
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*.html", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 渲染模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                template_name, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_from_strings() {
        let mut templates = HashMap::new();
        templates.insert(
            "verification_code.html".to_string(),
            "<p>{{ user_name }}: <b>{{ code }}</b></p>".to_string(),
        );

        let template = EmailTemplate::from_strings(templates).unwrap();

        let context = serde_json::json!({
            "user_name": "alice",
            "code": "042917"
        });

        let result = template.render("verification_code.html", &context).unwrap();
        assert_eq!(result, "<p>alice: <b>042917</b></p>");
    }

    #[test]
    fn test_html_autoescape() {
        let mut templates = HashMap::new();
        templates.insert("t.html".to_string(), "{{ name }}".to_string());
        let template = EmailTemplate::from_strings(templates).unwrap();

        let result = template
            .render("t.html", &serde_json::json!({ "name": "<script>" }))
            .unwrap();
        assert_eq!(result, "&lt;script&gt;");
    }

    #[test]
    fn test_unknown_template() {
        let template = EmailTemplate::from_strings(HashMap::new()).unwrap();
        assert!(template.render("missing.html", &serde_json::json!({})).is_err());
    }
}
