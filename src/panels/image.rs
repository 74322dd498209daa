use chrono::{DateTime, Utc};
use tracing::error;
use uuid::Uuid;

use crate::panels::{Backend, Notice};
use crate::proxy::{image::{DEFAULT_ASPECT_RATIO, DEFAULT_QUALITY}, ImageRequest};

pub const DEFAULT_MODEL: &str = "gemini-pro-vision";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub id: Uuid,
    pub prompt: String,
    pub url: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ImagePanel {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: String,
    pub quality: u8,
    images: Vec<GeneratedImage>,
    generating: bool,
    notices: Vec<Notice>,
}

impl Default for ImagePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePanel {
    pub fn new() -> Self {
        Self {
            prompt: String::new(),
            model: DEFAULT_MODEL.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            quality: DEFAULT_QUALITY,
            images: Vec::new(),
            generating: false,
            notices: Vec::new(),
        }
    }

    /// Newest first.
    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn is_loading(&self) -> bool {
        self.generating
    }

    pub fn can_generate(&self) -> bool {
        !self.generating && !self.prompt.trim().is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn generate(&mut self, backend: &dyn Backend) -> Option<&GeneratedImage> {
        if !self.can_generate() {
            return None;
        }

        self.generating = true;
        let req = ImageRequest {
            prompt: Some(self.prompt.clone()),
            model: Some(self.model.clone()),
            aspect_ratio: Some(self.aspect_ratio.clone()),
            quality: Some(i64::from(self.quality)),
        };
        let result = backend.generate_image(&req).await;
        self.generating = false;

        match result {
            Ok(reply) => {
                self.images.insert(
                    0,
                    GeneratedImage {
                        id: Uuid::new_v4(),
                        prompt: std::mem::take(&mut self.prompt),
                        url: reply.image_url,
                        model: self.model.clone(),
                        timestamp: Utc::now(),
                    },
                );
                self.notices.push(Notice::info(
                    "Image Generated!",
                    "Your AI-generated image is ready",
                ));
                self.images.first()
            }
            Err(e) => {
                error!("Image generation error: {}", e);
                self.notices.push(Notice::error(
                    "Generation Failed",
                    "Failed to generate image. Please try again.",
                ));
                None
            }
        }
    }

    /// File name offered when saving an image: `gra1-` plus the first 30
    /// prompt characters with anything non-alphanumeric replaced by `-`.
    pub fn download_name(image: &GeneratedImage) -> String {
        let stem: String = image
            .prompt
            .chars()
            .take(30)
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("gra1-{}.jpg", stem)
    }
}
