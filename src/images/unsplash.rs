//! Unsplash photo search client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::ImageSearch;
use crate::config::{ImageConfig, ENV_IMAGE_KEY};
use crate::error::{Error, Result};
use crate::model::ImageRef;

const SERVICE: &str = "Unsplash";
const MAX_ERROR_BODY: usize = 500;

/// Blocking client for `GET {api_url}/search/photos`.
#[derive(Clone)]
pub struct UnsplashClient {
    access_key: String,
    endpoint: String,
    client: Client,
}

impl std::fmt::Debug for UnsplashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsplashClient")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    #[serde(default)]
    user: Option<Photographer>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
}

impl UnsplashClient {
    /// Create a client from the image service settings.
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let access_key = config
            .api_key
            .clone()
            .ok_or(Error::MissingApiKey(ENV_IMAGE_KEY))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            access_key,
            endpoint: format!("{}/search/photos", config.api_url.trim_end_matches('/')),
            client,
        })
    }

    fn search(&self, query: &str) -> Result<Option<Photo>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(service_error(status.as_u16(), &body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("{} search reply: {}", SERVICE, e)))?;
        Ok(parsed.results.into_iter().next())
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(service_error(status.as_u16(), &body));
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn service_error(status: u16, body: &str) -> Error {
    Error::Service {
        service: SERVICE,
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

impl ImageSearch for UnsplashClient {
    fn find(&self, query: &str) -> Result<Option<ImageRef>> {
        let Some(photo) = self.search(query)? else {
            return Ok(None);
        };

        let url = photo.urls.regular;
        let data = self.download(&url)?;
        let mut image = ImageRef::new(query, url.as_str(), data).ok_or_else(|| {
            Error::MalformedResponse(format!("{} returned an unsupported image from {}", SERVICE, url))
        })?;
        image.attribution = photo.user.map(|user| user.name);
        Ok(Some(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageFormat;
    use crate::testing::png;
    use mockito::Matcher;

    fn client(url: &str) -> UnsplashClient {
        UnsplashClient::new(&ImageConfig {
            api_key: Some("access".to_string()),
            api_url: url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn find_searches_and_downloads() {
        let mut server = mockito::Server::new();
        let base = server.url();
        let search = server
            .mock("GET", "/search/photos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "solar panels".into()),
                Matcher::UrlEncoded("per_page".into(), "1".into()),
                Matcher::UrlEncoded("orientation".into(), "landscape".into()),
            ]))
            .match_header("authorization", "Client-ID access")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"total":1,"results":[{{"urls":{{"regular":"{}/photos/1.png"}},"user":{{"name":"Ann Lee"}}}}]}}"#,
                base
            ))
            .create();
        let download = server
            .mock("GET", "/photos/1.png")
            .with_status(200)
            .with_body(png(8, 6))
            .create();

        let image = client(&base).find("solar panels").unwrap().unwrap();

        assert_eq!(image.query, "solar panels");
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.pixel_size(), Some((8, 6)));
        assert_eq!(image.attribution.as_deref(), Some("Ann Lee"));
        assert!(image.url.ends_with("/photos/1.png"));
        search.assert();
        download.assert();
    }

    #[test]
    fn find_without_results_is_none() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/search/photos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total":0,"results":[]}"#)
            .create();

        assert!(client(&server.url()).find("nothing").unwrap().is_none());
    }

    #[test]
    fn find_reports_rate_limit() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/search/photos")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("Rate Limit Exceeded")
            .create();

        let err = client(&server.url()).find("x").unwrap_err();
        assert!(matches!(err, Error::Service { status: 403, .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalService);
    }

    #[test]
    fn find_rejects_non_image_payload() {
        let mut server = mockito::Server::new();
        let base = server.url();
        let _s = server
            .mock("GET", "/search/photos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"{{"results":[{{"urls":{{"regular":"{}/photos/2"}}}}]}}"#,
                base
            ))
            .create();
        let _d = server
            .mock("GET", "/photos/2")
            .with_status(200)
            .with_body("<html>not found</html>")
            .create();

        let err = client(&server.url()).find("x").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn new_requires_key() {
        let result = UnsplashClient::new(&ImageConfig::default());
        assert!(matches!(result, Err(Error::MissingApiKey("UNSPLASH_API_KEY"))));
    }
}
