use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client as ReqwestClient, Method, Response, Url};
use serde::Deserialize;

use crate::{signer::RequestSigner, SumsubConfig, SumsubError};

/// Error body returned by the provider alongside non-2xx statuses.
#[derive(Deserialize, Debug)]
struct ApiError {
    description: String,
    code: u16,
}

/// One HTTP session against the provider, reused for every call of a run.
#[derive(Clone, Debug)]
pub struct SumsubClient {
    client: ReqwestClient,
    signer: RequestSigner,
    base_url: Url,
}

impl SumsubClient {
    pub fn new(config: &SumsubConfig) -> Result<Self, SumsubError> {
        let signer = RequestSigner::new(&config.sumsub_key, &config.sumsub_secret)?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SumsubError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SumsubError::InvalidBaseUrl(config.base_url.clone()));
        }
        let client = ReqwestClient::builder()
            .use_rustls_tls()
            .timeout(config.timeout)
            .build()
            .map_err(SumsubError::ClientBuild)?;

        Ok(Self {
            client,
            signer,
            base_url,
        })
    }

    /// Raw applicant payload for the customer registered as `externalUserId`.
    #[tracing::instrument(name = "sumsub.get_applicant", skip(self), err)]
    pub async fn get_applicant(&self, customer_id: &str) -> Result<String, SumsubError> {
        let url = self.url(&[
            "resources",
            "applicants",
            &format!("-;externalUserId={customer_id}"),
            "one",
        ]);
        let response = self.send_signed(Method::GET, url, None).await?;
        into_body(response).await
    }

    /// Raw listing of the document resources attached to an applicant.
    #[tracing::instrument(name = "sumsub.get_document_metadata", skip(self), err)]
    pub async fn get_document_metadata(&self, applicant_id: &str) -> Result<String, SumsubError> {
        let url = self.url(&["resources", "applicants", applicant_id, "metadata", "resources"]);
        let response = self.send_signed(Method::GET, url, None).await?;
        into_body(response).await
    }

    /// Base64-encoded image content, or `None` when the provider has nothing
    /// to serve for that image.
    #[tracing::instrument(name = "sumsub.get_document_image", skip(self), err)]
    pub async fn get_document_image(
        &self,
        inspection_id: &str,
        image_id: &str,
    ) -> Result<Option<String>, SumsubError> {
        let url = self.url(&["resources", "inspections", inspection_id, "resources", image_id]);
        let response = self.send_signed(Method::GET, url, None).await?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = %response.status(), "no image content");
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        Ok(Some(STANDARD.encode(bytes)))
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // The signature must cover the path exactly as it goes out on the wire.
    async fn send_signed(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Response, SumsubError> {
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let signed = self
            .signer
            .sign_now(method.as_str(), &path_and_query, body.as_deref())?;
        let headers = self.signer.headers(&signed)?;

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}

async fn into_body(response: Response) -> Result<String, SumsubError> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        return Ok(text);
    }

    match serde_json::from_str::<ApiError>(&text) {
        Ok(ApiError { description, code }) => Err(SumsubError::Api { code, description }),
        Err(_) => Err(SumsubError::Api {
            code: status.as_u16(),
            description: text,
        }),
    }
}
