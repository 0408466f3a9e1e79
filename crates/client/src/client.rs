use std::future::Future;
use std::sync::{Arc, OnceLock};

use medcab_auth::TokenStore;
use medcab_config::ApiConfig;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::body::ErrorBody;
use crate::error::ApiError;

const SIGNAL_CAPACITY: usize = 16;

/// Raised once for every `401`/`403` answer to a bearer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedSignal {
    pub status: StatusCode,
    pub endpoint: String,
}

/// The one reaction to authorization failures. Runs before the failing
/// request returns its error.
pub type UnauthorizedHandler = Arc<dyn Fn(&UnauthorizedSignal) + Send + Sync>;

/// Shape of one outbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    /// Aborts the request when cancelled, e.g. when the initiating view goes away.
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

struct ClientInner {
    http: Client,
    api: ApiConfig,
    store: Arc<dyn TokenStore>,
    signals: broadcast::Sender<UnauthorizedSignal>,
    handler: OnceLock<UnauthorizedHandler>,
}

#[derive(Clone)]
pub struct ProtectedClient {
    inner: Arc<ClientInner>,
}

impl ProtectedClient {
    pub fn new(api: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(api.request_timeout())
            .user_agent(api.user_agent.clone())
            .build()
            .map_err(ApiError::Client)?;

        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api: api.clone(),
                store,
                signals,
                handler: OnceLock::new(),
            }),
        })
    }

    pub fn api(&self) -> &ApiConfig {
        &self.inner.api
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }

    pub fn endpoint(&self, path: &str) -> String {
        self.inner.api.endpoint(path)
    }

    /// Observe authorization failures without acting on them. Observers are
    /// notified after the handler has run.
    pub fn subscribe_unauthorized(&self) -> broadcast::Receiver<UnauthorizedSignal> {
        self.inner.signals.subscribe()
    }

    /// Install the one component allowed to react to authorization failures.
    /// Returns `false` and drops `handler` when one is already installed.
    pub fn install_unauthorized_handler(&self, handler: UnauthorizedHandler) -> bool {
        let installed = self.inner.handler.set(handler).is_ok();
        if !installed {
            debug!("unauthorized handler already installed");
        }
        installed
    }

    pub fn has_unauthorized_handler(&self) -> bool {
        self.inner.handler.get().is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(endpoint, RequestOptions::get())
            .await?
            .ok_or(ApiError::EmptyResponse(StatusCode::NO_CONTENT))
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.with_body(Method::POST, endpoint, body).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.with_body(Method::PUT, endpoint, body).await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.with_body(Method::PATCH, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.send::<Value>(endpoint, RequestOptions::new(Method::DELETE))
            .await
            .map(|_| ())
    }

    /// Send with the stored bearer token if there is one. `204` and empty
    /// bodies yield `None`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        self.execute(endpoint, options, Auth::Bearer).await
    }

    /// Like [`send`](Self::send) but refuses to go out without a stored token.
    pub async fn fetch_protected<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        if self.inner.store.load()?.is_none() {
            return Err(ApiError::MissingToken);
        }
        self.execute(endpoint, options, Auth::Bearer).await
    }

    /// Send without credentials and without publishing authorization
    /// failures. Used for sign-in and sign-up.
    pub async fn send_anonymous<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        self.execute(endpoint, options, Auth::Anonymous).await
    }

    /// Fetch with an explicit token instead of the stored one. Authorization
    /// failures are returned without publishing a signal; the caller owns the
    /// reaction.
    pub async fn get_with_token<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(endpoint);
        let request = self.inner.http.get(&url).bearer_auth(token);
        self.dispatch(endpoint, request, None, false)
            .await?
            .ok_or(ApiError::EmptyResponse(StatusCode::NO_CONTENT))
    }

    async fn with_body<B, T>(&self, method: Method, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::new(method).json(body)?;
        self.send(endpoint, options)
            .await?
            .ok_or(ApiError::EmptyResponse(StatusCode::NO_CONTENT))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        auth: Auth,
    ) -> Result<Option<T>, ApiError> {
        let url = self.endpoint(endpoint);
        let mut request = self.inner.http.request(options.method.clone(), &url);

        if auth == Auth::Bearer {
            if let Some(token) = self.inner.store.load()? {
                request = request.bearer_auth(token);
            }
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        self.dispatch(endpoint, request, options.cancel.as_ref(), auth == Auth::Bearer)
            .await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
        cancel: Option<&CancellationToken>,
        publish: bool,
    ) -> Result<Option<T>, ApiError> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ApiError::Cancelled);
        }

        let response = cancellable(cancel, request.send()).await?;
        let status = response.status();
        let bytes = cancellable(cancel, response.bytes()).await?;

        debug!(endpoint, %status, "backend responded");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = ErrorBody::from_slice(&bytes);
            if publish {
                self.publish_unauthorized(status, endpoint);
            }
            return Err(ApiError::Unauthorized { status, body });
        }

        if !status.is_success() {
            return Err(ApiError::Application {
                status,
                body: ErrorBody::from_slice(&bytes),
            });
        }

        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn publish_unauthorized(&self, status: StatusCode, endpoint: &str) {
        warn!(endpoint, %status, "request rejected as unauthorized");
        let signal = UnauthorizedSignal {
            status,
            endpoint: endpoint.to_string(),
        };
        match self.inner.handler.get() {
            Some(handler) => handler(&signal),
            None => debug!("no unauthorized handler installed"),
        }
        if self.inner.signals.send(signal).is_err() {
            debug!("no unauthorized observers");
        }
    }
}

impl std::fmt::Debug for ProtectedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedClient")
            .field("base_url", &self.inner.api.base_url)
            .field("store", &self.inner.store)
            .field("handler_installed", &self.has_unauthorized_handler())
            .finish()
    }
}

async fn cancellable<T, F>(cancel: Option<&CancellationToken>, future: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = future => result.map_err(ApiError::from),
        },
        None => future.await.map_err(ApiError::from),
    }
}
