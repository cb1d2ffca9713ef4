//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::domain::{
    AccessToken, CheckPaymentStatus, CheckoutRequestId, ConsumerKey, ConsumerSecret,
    InitiatePayment, InitiatePaymentResponse, PaymentStatus, ResponseCode, ValidationError,
};
use crate::transport::InitiateOutcome;

const DEFAULT_INITIATE_PATH: &str = "api/mpesa/initialize";
const DEFAULT_STATUS_PATH: &str = "api/mpesa/status";
const DEFAULT_TOKEN_ENDPOINT: &str =
    "https://api.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestAuth {
    None,
    Bearer(String),
    Basic { username: String, password: String },
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a Url,
        body: Value,
        auth: RequestAuth,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a Url,
        body: Value,
        auth: RequestAuth,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut request = self.client.post(url.clone()).json(&body);
            request = match auth {
                RequestAuth::None => request,
                RequestAuth::Bearer(token) => request.bearer_auth(token),
                RequestAuth::Basic { username, password } => {
                    request.basic_auth(username, Some(password))
                }
            };
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Daraja OAuth credentials (consumer key + secret) used by [`GatewayClient::generate_token`].
pub struct Credentials {
    consumer_key: ConsumerKey,
    consumer_secret: ConsumerSecret,
}

impl Credentials {
    /// Create credentials and validate that both parts are non-empty.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            consumer_key: ConsumerKey::new(consumer_key)?,
            consumer_secret: ConsumerSecret::new(consumer_secret)?,
        })
    }

    fn basic_auth(&self) -> RequestAuth {
        RequestAuth::Basic {
            username: self.consumer_key.as_str().to_owned(),
            password: self.consumer_secret.as_str().to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GatewayClient`].
///
/// [`GatewayError::is_unavailable`] and [`GatewayError::is_rejected`] split these into
/// "could not reach the gateway" and "the gateway said no".
pub enum GatewayError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("gateway unavailable: {0}")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the gateway.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway answered with a non-success `responseCode`.
    #[error("gateway rejected request: {response_code:?} {response_description:?}")]
    Rejected {
        response_code: ResponseCode,
        response_description: Option<String>,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The token endpoint answered without an access token.
    #[error("token endpoint returned no access token")]
    Auth,

    /// Token generation was requested on a client built without credentials.
    #[error("no credentials configured")]
    MissingCredentials,

    /// An endpoint URL could not be built from the configured base URL.
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    /// The gateway could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The gateway was reached but did not accept the request.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. } | Self::Rejected { .. } | Self::Parse(_) | Self::Auth
        )
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayClient`].
///
/// Use this when you need to customize endpoints, timeout, user-agent, or credentials.
pub struct GatewayClientBuilder {
    base_url: Url,
    initiate_endpoint: Option<String>,
    status_endpoint: Option<String>,
    token_endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    credentials: Option<Credentials>,
    access_token: Option<AccessToken>,
}

impl GatewayClientBuilder {
    /// Create a builder rooted at `base_url` (the backend that proxies the STK push API).
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            initiate_endpoint: None,
            status_endpoint: None,
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            credentials: None,
            access_token: None,
        }
    }

    /// Start from a loaded [`GatewayConfig`].
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut builder = Self::new(config.base_url.clone());
        builder.timeout = config.timeout;
        builder.user_agent = config.user_agent.clone();
        builder.credentials = config.credentials.clone();
        builder
    }

    /// Override the initiate endpoint; relative values are joined onto the base URL.
    pub fn initiate_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.initiate_endpoint = Some(endpoint.into());
        self
    }

    /// Override the status endpoint; relative values are joined onto the base URL.
    pub fn status_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.status_endpoint = Some(endpoint.into());
        self
    }

    /// Override the OAuth token endpoint (absolute URL).
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Send `token` as a bearer token on initiate and status calls.
    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Build a [`GatewayClient`].
    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let base_url = with_trailing_slash(self.base_url);
        let initiate_endpoint = base_url.join(
            self.initiate_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_INITIATE_PATH),
        )?;
        let status_endpoint = base_url.join(
            self.status_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_STATUS_PATH),
        )?;
        let token_endpoint = Url::parse(&self.token_endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| GatewayError::Unavailable(Box::new(err)))?;

        Ok(GatewayClient {
            initiate_endpoint,
            status_endpoint,
            token_endpoint,
            credentials: self.credentials,
            access_token: self.access_token,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Clone)]
/// Client for the STK push gateway.
///
/// Two calls matter: [`GatewayClient::initiate_payment`] and
/// [`GatewayClient::check_status`]. Neither retries; polling is the job of
/// [`crate::PaymentVerifier`].
pub struct GatewayClient {
    initiate_endpoint: Url,
    status_endpoint: Url,
    token_endpoint: Url,
    credentials: Option<Credentials>,
    access_token: Option<AccessToken>,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("initiate_endpoint", &self.initiate_endpoint.as_str())
            .field("status_endpoint", &self.status_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("has_credentials", &self.credentials.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a client with default endpoints under `base_url`.
    ///
    /// For more customization, use [`GatewayClient::builder`].
    pub fn new(base_url: Url) -> Result<Self, GatewayError> {
        GatewayClientBuilder::new(base_url).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(base_url: Url) -> GatewayClientBuilder {
        GatewayClientBuilder::new(base_url)
    }

    /// Attach a bearer token for subsequent initiate and status calls.
    pub fn with_access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Ask the gateway to send an STK push prompt to the payer's phone.
    ///
    /// The phone number is normalized (`07…` → `2547…`) before sending.
    ///
    /// Errors:
    /// - [`GatewayError::Unavailable`] when the gateway cannot be reached,
    /// - [`GatewayError::HttpStatus`] for non-2xx HTTP responses,
    /// - [`GatewayError::Rejected`] when `responseCode` is not `"0"`.
    pub async fn initiate_payment(
        &self,
        request: InitiatePayment,
    ) -> Result<InitiatePaymentResponse, GatewayError> {
        debug!(
            phone = %request.phone_number().masked(),
            amount = request.amount().value(),
            "initiating stk push"
        );

        let body = crate::transport::encode_initiate_payment_json(&request);
        let response = self
            .post(&self.initiate_endpoint, body, self.bearer_auth())
            .await?;

        let outcome = crate::transport::decode_initiate_payment_json_response(&response)
            .map_err(|err| GatewayError::Parse(Box::new(err)))?;

        match outcome {
            InitiateOutcome::Accepted(parsed) => {
                debug!(
                    checkout_request_id = parsed.checkout_request_id.as_str(),
                    "stk push accepted"
                );
                Ok(parsed)
            }
            InitiateOutcome::Rejected {
                response_code,
                response_description,
            } => Err(GatewayError::Rejected {
                response_code,
                response_description,
            }),
        }
    }

    /// Check whether the payment behind `request` has completed, surfacing every failure.
    pub async fn try_check_status(
        &self,
        request: &CheckPaymentStatus,
    ) -> Result<PaymentStatus, GatewayError> {
        let body = crate::transport::encode_check_status_json(request);
        let response = self
            .post(&self.status_endpoint, body, self.bearer_auth())
            .await?;

        crate::transport::decode_check_status_json_response(&response)
            .map_err(|err| GatewayError::Parse(Box::new(err)))
    }

    /// Check whether the payment has completed.
    ///
    /// Any failure is reported as [`PaymentStatus::Pending`] so a poll loop keeps going
    /// through transient network errors.
    pub async fn check_status(&self, checkout_request_id: &CheckoutRequestId) -> PaymentStatus {
        let request = CheckPaymentStatus::new(checkout_request_id.clone());
        match self.try_check_status(&request).await {
            Ok(status) => status,
            Err(err) => {
                warn!(
                    checkout_request_id = checkout_request_id.as_str(),
                    error = %err,
                    "payment status check failed"
                );
                PaymentStatus::Pending
            }
        }
    }

    /// Exchange the configured consumer key/secret for an OAuth access token.
    pub async fn generate_token(&self) -> Result<AccessToken, GatewayError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(GatewayError::MissingCredentials)?;

        let response = self
            .post(
                &self.token_endpoint,
                Value::Object(serde_json::Map::new()),
                credentials.basic_auth(),
            )
            .await?;

        crate::transport::decode_token_json_response(&response)
            .map_err(|err| GatewayError::Parse(Box::new(err)))?
            .ok_or(GatewayError::Auth)
    }

    fn bearer_auth(&self) -> RequestAuth {
        match &self.access_token {
            Some(token) => RequestAuth::Bearer(token.token.clone()),
            None => RequestAuth::None,
        }
    }

    async fn post(
        &self,
        url: &Url,
        body: Value,
        auth: RequestAuth,
    ) -> Result<String, GatewayError> {
        let response = self
            .http
            .post_json(url, body, auth)
            .await
            .map_err(GatewayError::Unavailable)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(GatewayError::HttpStatus {
                status: response.status,
                body,
            });
        }

        Ok(response.body)
    }
}

/// The two gateway operations the verifier depends on.
///
/// [`GatewayClient`] is the production implementation; tests substitute scripted gateways.
pub trait PaymentGateway: Send + Sync {
    fn initiate<'a>(
        &'a self,
        request: InitiatePayment,
    ) -> BoxFuture<'a, Result<InitiatePaymentResponse, GatewayError>>;

    /// Must not fail: transport errors are reported as [`PaymentStatus::Pending`].
    fn check_status<'a>(
        &'a self,
        checkout_request_id: &'a CheckoutRequestId,
    ) -> BoxFuture<'a, PaymentStatus>;
}

impl<T: PaymentGateway + ?Sized> PaymentGateway for Arc<T> {
    fn initiate<'a>(
        &'a self,
        request: InitiatePayment,
    ) -> BoxFuture<'a, Result<InitiatePaymentResponse, GatewayError>> {
        (**self).initiate(request)
    }

    fn check_status<'a>(
        &'a self,
        checkout_request_id: &'a CheckoutRequestId,
    ) -> BoxFuture<'a, PaymentStatus> {
        (**self).check_status(checkout_request_id)
    }
}

impl PaymentGateway for GatewayClient {
    fn initiate<'a>(
        &'a self,
        request: InitiatePayment,
    ) -> BoxFuture<'a, Result<InitiatePaymentResponse, GatewayError>> {
        Box::pin(self.initiate_payment(request))
    }

    fn check_status<'a>(
        &'a self,
        checkout_request_id: &'a CheckoutRequestId,
    ) -> BoxFuture<'a, PaymentStatus> {
        Box::pin(GatewayClient::check_status(self, checkout_request_id))
    }
}
