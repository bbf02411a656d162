//! reqwest-backed access to the `/cars` collection resource.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Car, CarId},
    error::describe_error_body,
    protocol::CarFields,
};
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::ClientError, CarApi};

pub struct HttpCarApi {
    http: Client,
    base_url: Url,
}

impl HttpCarApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = settings
            .base_url()
            .map_err(|_| ClientError::InvalidBaseUrl(settings.api_base_url.clone()))?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, id: Option<&CarId>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("cars");
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }
}

async fn checked_body(response: Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail: describe_error_body(&body),
        });
    }
    Ok(body.to_vec())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = checked_body(response).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl CarApi for HttpCarApi {
    async fn list_cars(&self) -> Result<Vec<Car>, ClientError> {
        let url = self.endpoint(None)?;
        debug!(%url, "GET cars");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    async fn create_car(&self, fields: &CarFields) -> Result<Car, ClientError> {
        let url = self.endpoint(None)?;
        debug!(%url, "POST car");
        let response = self.http.post(url).json(fields).send().await?;
        read_json(response).await
    }

    async fn update_car(&self, id: &CarId, fields: &CarFields) -> Result<Car, ClientError> {
        let url = self.endpoint(Some(id))?;
        debug!(%url, "PUT car");
        let response = self.http.put(url).json(fields).send().await?;
        read_json(response).await
    }

    async fn delete_car(&self, id: &CarId) -> Result<(), ClientError> {
        let url = self.endpoint(Some(id))?;
        debug!(%url, "DELETE car");
        let response = self.http.delete(url).send().await?;
        let body = checked_body(response).await?;
        // The body is ignored, but when there is one it has to be JSON.
        if !body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice::<serde_json::Value>(&body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpCarApi {
        HttpCarApi::new(Url::parse(base).expect("base url"))
    }

    #[test]
    fn collection_path_is_appended_to_base() {
        assert_eq!(
            api("https://cars.example").endpoint(None).expect("url").as_str(),
            "https://cars.example/cars"
        );
        assert_eq!(
            api("http://localhost:8000/api/")
                .endpoint(Some(&CarId::Number(7)))
                .expect("url")
                .as_str(),
            "http://localhost:8000/api/cars/7"
        );
    }

    #[test]
    fn text_ids_become_one_encoded_segment() {
        assert_eq!(
            api("http://localhost:8000")
                .endpoint(Some(&CarId::Text("a/b c".to_string())))
                .expect("url")
                .as_str(),
            "http://localhost:8000/cars/a%2Fb%20c"
        );
    }

    #[test]
    fn timeout_from_settings_is_optional() {
        let settings = Settings {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout: Some(std::time::Duration::from_secs(5)),
            ..Settings::default()
        };
        let api = HttpCarApi::from_settings(&settings).expect("client");
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/");

        let bad = Settings {
            api_base_url: "mailto:cars@example.com".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            HttpCarApi::from_settings(&bad),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
