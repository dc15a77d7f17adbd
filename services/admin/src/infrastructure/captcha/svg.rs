//! SVG 图形验证码生成

use console_config::CaptchaConfig;
use console_errors::{AppError, AppResult};
use rand::Rng;
use rand::seq::SliceRandom;

const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 生成结果
#[derive(Debug, Clone)]
pub struct Captcha {
    pub text: String,
    pub svg: String,
}

#[derive(Debug, Clone)]
pub struct CaptchaGenerator {
    config: CaptchaConfig,
    charset: Vec<char>,
}

impl CaptchaGenerator {
    pub fn new(config: CaptchaConfig) -> AppResult<Self> {
        let charset: Vec<char> = ALPHABET
            .chars()
            .filter(|c| !config.ignore_chars.contains(*c))
            .collect();

        if charset.is_empty() {
            return Err(AppError::validation(
                "captcha.ignore_chars leaves no characters to draw",
            ));
        }
        if config.size == 0 || config.width == 0 || config.height == 0 {
            return Err(AppError::validation(
                "captcha size, width and height must be positive",
            ));
        }

        Ok(Self { config, charset })
    }

    pub fn generate(&self) -> Captcha {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Captcha {
        let text: String = (0..self.config.size)
            .filter_map(|_| self.charset.choose(rng).copied())
            .collect();

        let width = f64::from(self.config.width);
        let height = f64::from(self.config.height);
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.config.width,
            h = self.config.height
        );

        for _ in 0..self.config.noise {
            let start_y = rng.gen_range(0.0..height);
            let end_y = rng.gen_range(0.0..height);
            let ctrl_x = rng.gen_range(0.0..width);
            let ctrl_y = rng.gen_range(0.0..height);
            let color = self.pick_color(rng);
            svg.push_str(&format!(
                r#"<path d="M0 {start_y:.1} Q{ctrl_x:.1} {ctrl_y:.1} {width:.1} {end_y:.1}" stroke="{color}" fill="none"/>"#
            ));
        }

        let slot = width / (text.chars().count() as f64 + 1.0);
        let font_size = self.config.font_size;
        for (i, ch) in text.chars().enumerate() {
            let x = slot * (i as f64 + 1.0) + rng.gen_range(-slot / 5.0..=slot / 5.0);
            let y = height / 2.0 + f64::from(font_size) / 3.0 + rng.gen_range(-4.0..=4.0);
            let angle = rng.gen_range(-30..=30);
            let color = self.pick_color(rng);
            svg.push_str(&format!(
                r#"<text x="{x:.1}" y="{y:.1}" fill="{color}" font-size="{font_size}" font-family="monospace" text-anchor="middle" transform="rotate({angle} {x:.1} {y:.1})">{ch}</text>"#
            ));
        }

        svg.push_str("</svg>");
        Captcha { text, svg }
    }

    fn pick_color<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if self.config.color {
            format!("hsl({}, 60%, 40%)", rng.gen_range(0..360))
        } else {
            "#444".to_string()
        }
    }
}
