use super::{GenerationRequest, StoryImageService};
use crate::image::GeneratedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockResponse {
    Image(Vec<u8>),
    ServerError(u16),
}

/// Scripted stand-in for [`StoryDiffusionClient`](super::StoryDiffusionClient).
///
/// Responses are replayed in order and cycle once exhausted. Image bytes go
/// through the real decoder, so invalid bytes surface as `InvalidImageData`.
#[derive(Clone)]
pub struct MockStoryImageClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockStoryImageClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Image(response));
        self
    }

    pub fn with_server_error(self, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::ServerError(status));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Requests received so far, oldest first.
    pub fn get_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn default_image() -> Result<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| Error::InvalidImageData(format!("Failed to encode mock image: {}", e)))?;
        Ok(bytes)
    }
}

impl Default for MockStoryImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryImageService for MockStoryImageClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let response = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.requests.lock().unwrap().push(request.clone());

            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses[(*count - 1) % responses.len()].clone())
            }
        };

        match response {
            None => GeneratedImage::decode(Self::default_image()?),
            Some(MockResponse::Image(bytes)) => GeneratedImage::decode(bytes),
            Some(MockResponse::ServerError(status)) => Err(Error::Server {
                status,
                body: "mock failure".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::generated::test_images;
    use crate::models::{Character, SceneInput, StorySetup};
    use crate::prompts;

    fn request() -> GenerationRequest {
        let prompt = prompts::assemble(
            &[SceneInput::new("a cat naps", false)],
            &Character::default(),
            &StorySetup::default(),
        )
        .unwrap();
        GenerationRequest::new("a grey cat", "Minimal", prompt)
    }

    #[tokio::test]
    async fn test_mock_default_image_decodes() {
        let client = MockStoryImageClient::new();

        let image = client.generate(&request()).await.unwrap();
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_responses_cycle() {
        let client = MockStoryImageClient::new()
            .with_server_error(500)
            .with_image_response(test_images::png());

        let first = client.generate(&request()).await.unwrap_err();
        assert!(matches!(first, Error::Server { status: 500, .. }));

        assert!(client.generate(&request()).await.is_ok());

        // Should cycle back
        let third = client.generate(&request()).await.unwrap_err();
        assert!(matches!(third, Error::Server { status: 500, .. }));
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_rejects_invalid_bytes() {
        let client = MockStoryImageClient::new().with_image_response(vec![1, 2, 3]);

        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidImageData(_)));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockStoryImageClient::new();
        let probe = client.clone();

        client.generate(&request()).await.unwrap();

        let requests = probe.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].style_name(), "Minimal");
        assert_eq!(requests[0].comic_description(), "a cat naps");
    }
}
