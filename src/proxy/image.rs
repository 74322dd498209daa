use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

use crate::proxy::ProxyError;
use crate::vision::{VisionError, VisionProvider};

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";
pub const DEFAULT_QUALITY: u8 = 80;
const LONG_EDGE: u32 = 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReply {
    pub success: bool,
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: String,
    pub quality: u8,
    pub image_url: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Forwards prompts to a vision model and answers with a placeholder image.
///
/// The vision model returns text only, so `imageUrl` is a deterministic
/// placeholder derived from the prompt, model, aspect ratio and quality. The
/// same inputs always give the same reference and changing any of them changes
/// it, so a caller never sees a previous call's image for a new request.
pub struct ImageProxy {
    provider: Arc<dyn VisionProvider>,
    default_model: String,
    placeholder_base: Url,
}

impl ImageProxy {
    pub fn new(provider: Arc<dyn VisionProvider>, default_model: String, placeholder_base: Url) -> Self {
        Self {
            provider,
            default_model,
            placeholder_base,
        }
    }

    pub async fn handle(&self, req: ImageRequest) -> Result<ImageReply, ProxyError> {
        let prompt = match req.prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(ProxyError::validation("Prompt is required")),
        };

        let quality = match req.quality {
            None => DEFAULT_QUALITY,
            Some(q) if (1..=100).contains(&q) => q as u8,
            Some(_) => return Err(ProxyError::validation("Quality must be between 1 and 100")),
        };

        let aspect_ratio = req
            .aspect_ratio
            .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string());
        let (width, height) = dimensions(&aspect_ratio)
            .ok_or_else(|| ProxyError::validation("Aspect ratio must look like 16:9"))?;

        let model = req.model.unwrap_or_else(|| self.default_model.clone());

        info!("Generating image with prompt: {}", prompt);

        let description = match self
            .provider
            .describe(&enhanced_prompt(&prompt, &aspect_ratio, quality))
            .await
        {
            Ok(text) => text,
            Err(VisionError::NotConfigured(what)) => {
                error!("{} not found", what);
                return Err(ProxyError::not_configured(what));
            }
            Err(e) => {
                error!("Error in image proxy ({}): {}", self.provider.name(), e);
                return Err(ProxyError::upstream("Failed to generate image", e.to_string()));
            }
        };

        let image_url = placeholder_url(
            &self.placeholder_base,
            &prompt,
            &model,
            &aspect_ratio,
            quality,
            (width, height),
        );

        info!("Image generation successful");

        Ok(ImageReply {
            success: true,
            prompt,
            model,
            aspect_ratio,
            quality,
            image_url,
            description,
            timestamp: Utc::now(),
        })
    }
}

pub fn enhanced_prompt(prompt: &str, aspect_ratio: &str, quality: u8) -> String {
    format!(
        "Create a high-quality, detailed image: {}. Style: photorealistic, high resolution, \
         professional quality. Aspect ratio: {}. Quality: {}%.",
        prompt, aspect_ratio, quality
    )
}

/// Pixel size for a `W:H` ratio with the long edge at 1024.
pub fn dimensions(aspect_ratio: &str) -> Option<(u32, u32)> {
    let (w, h) = aspect_ratio.split_once(':')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }

    let scale = |short: u32, long: u32| {
        ((LONG_EDGE as u64 * short as u64 + long as u64 / 2) / long as u64).max(1) as u32
    };
    if w >= h {
        Some((LONG_EDGE, scale(h, w)))
    } else {
        Some((scale(w, h), LONG_EDGE))
    }
}

pub fn placeholder_url(
    base: &Url,
    prompt: &str,
    model: &str,
    aspect_ratio: &str,
    quality: u8,
    (width, height): (u32, u32),
) -> String {
    let quality = quality.to_string();
    let mut hasher = Sha256::new();
    for part in [model, aspect_ratio, quality.as_str(), prompt] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let sig = hex::encode(&hasher.finalize()[..8]);
    let caption: String = prompt.chars().take(50).collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("w", &width.to_string())
        .append_pair("h", &height.to_string())
        .append_pair("fit", "crop")
        .append_pair("crop", "entropy")
        .append_pair("auto", "format")
        .append_pair("fm", "jpg")
        .append_pair("q", &quality)
        .append_pair("txt", &caption)
        .append_pair("sig", &sig);
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://images.example.com/photo").unwrap()
    }

    #[test]
    fn dimensions_follow_ratio() {
        assert_eq!(dimensions("1:1"), Some((1024, 1024)));
        assert_eq!(dimensions("16:9"), Some((1024, 576)));
        assert_eq!(dimensions("9:16"), Some((576, 1024)));
        assert_eq!(dimensions("4:3"), Some((1024, 768)));
        assert_eq!(dimensions("0:3"), None);
        assert_eq!(dimensions("square"), None);
    }

    #[test]
    fn placeholder_is_stable_for_same_inputs() {
        let a = placeholder_url(&base(), "a fox", "m", "1:1", 80, (1024, 1024));
        let b = placeholder_url(&base(), "a fox", "m", "1:1", 80, (1024, 1024));
        assert_eq!(a, b);
    }

    #[test]
    fn placeholder_varies_with_every_input() {
        let a = placeholder_url(&base(), "a fox", "m", "1:1", 80, (1024, 1024));
        assert_ne!(a, placeholder_url(&base(), "a cat", "m", "1:1", 80, (1024, 1024)));
        assert_ne!(a, placeholder_url(&base(), "a fox", "other", "1:1", 80, (1024, 1024)));
        assert_ne!(a, placeholder_url(&base(), "a fox", "m", "1:1", 81, (1024, 1024)));
        assert_ne!(a, placeholder_url(&base(), "a fox", "m", "16:9", 80, (1024, 576)));
    }

    #[test]
    fn placeholder_caption_is_truncated() {
        let long = "x".repeat(80);
        let url = Url::parse(&placeholder_url(&base(), &long, "m", "1:1", 80, (1024, 1024))).unwrap();
        let txt = url
            .query_pairs()
            .find(|(k, _)| k == "txt")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(txt.len(), 50);
    }

    #[test]
    fn enhanced_prompt_carries_ratio_and_quality() {
        let p = enhanced_prompt("a lighthouse", "16:9", 90);
        assert!(p.starts_with("Create a high-quality, detailed image: a lighthouse."));
        assert!(p.contains("Aspect ratio: 16:9."));
        assert!(p.ends_with("Quality: 90%."));
    }
}
