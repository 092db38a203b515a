//! Wikipedia page-image lookup.
//!
//! Picks the Hebrew or English edition by classifying the singer name, issues a
//! single request, and absorbs every failure into `None`.

use super::SingerImageResolver;
use crate::text::Language;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Page id used by the API to flag a missing page.
const MISSING_PAGE_ID: &str = "-1";

const MIN_NAME_LENGTH: usize = 2;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 500;

pub struct WikipediaClient {
    client: reqwest::Client,
    thumbnail_size: u32,
}

#[derive(Deserialize)]
struct PageImagesResponse {
    query: Option<QueryBody>,
}

#[derive(Deserialize)]
struct QueryBody {
    pages: Option<HashMap<String, Page>>,
}

#[derive(Deserialize)]
struct Page {
    thumbnail: Option<ImageInfo>,
    original: Option<ImageInfo>,
}

#[derive(Deserialize)]
struct ImageInfo {
    source: Option<String>,
}

/// Thumbnail first, then the full-size image, else nothing. A `-1` page id
/// means the page does not exist.
fn extract_image_url(response: PageImagesResponse) -> Option<String> {
    let pages = response.query?.pages?;
    let (page_id, page) = pages.into_iter().next()?;
    if page_id == MISSING_PAGE_ID {
        return None;
    }
    page.thumbnail
        .and_then(|t| t.source)
        .or_else(|| page.original.and_then(|o| o.source))
}

impl WikipediaClient {
    pub fn new(thumbnail_size: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            thumbnail_size,
        }
    }

    fn page_images_url(&self, name: &str, language: Language) -> String {
        format!(
            "https://{}.wikipedia.org/w/api.php?action=query&titles={}&prop=pageimages&piprop=thumbnail%7Coriginal&format=json&pithumbsize={}&origin=*",
            language.as_str(),
            urlencoding::encode(name),
            self.thumbnail_size,
        )
    }
}

impl Default for WikipediaClient {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

#[async_trait]
impl SingerImageResolver for WikipediaClient {
    async fn resolve(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            return None;
        }

        let language = Language::of(name);
        let url = self.page_images_url(name, language);
        debug!("Fetching image for {:?} from {} Wikipedia", name, language);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Wikipedia request for {:?} failed: {}", name, err);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Wikipedia request for {:?} returned status {}",
                name,
                response.status()
            );
            return None;
        }

        let body: PageImagesResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Could not parse Wikipedia response for {:?}: {}", name, err);
                return None;
            }
        };

        match extract_image_url(body) {
            Some(source) => {
                debug!("Found image for {:?}: {}", name, source);
                Some(source)
            }
            None => {
                debug!("No Wikipedia image for {:?}", name);
                None
            }
        }
    }
}
