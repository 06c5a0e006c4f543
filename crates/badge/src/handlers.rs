//! # Handlers
//!
//! Entry points for the API layer. Requests are routed to the appropriate
//! handler for processing, returning a response that can be serialized to
//! JSON or mapped directly to HTTP.

mod init_issuance;
mod issue_credential;
mod status_list;
mod storages;

use std::fmt::Debug;
use std::ops::Deref;

use http::StatusCode;
use tracing::instrument;

use crate::config::Config;
use crate::context::RequestContext;
pub use crate::error::Error;
use crate::provider::Provider;

/// Result type for issuance operations.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Handle incoming requests.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// request's viability. Expected failures include invalid input, unknown
/// entities, revoked achievements and signing failures.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(config, provider))]
pub async fn handle<B, H, P, U>(
    config: &Config, request: impl Into<Request<B, H>> + Debug, provider: &P,
) -> Result<Response<U>>
where
    B: Body,
    H: Headers,
    P: Provider,
    Request<B, H>: Handler<U, P, Error = Error>,
{
    let request: Request<B, H> = request.into();
    Ok(request.handle(config, provider).await?.into())
}

/// A request to process.
#[derive(Clone, Debug)]
pub struct Request<B, H = NoHeaders>
where
    B: Body,
    H: Headers,
{
    /// The request to process.
    pub body: B,

    /// Headers associated with this request.
    pub headers: H,
}

impl<B: Body> From<B> for Request<B> {
    fn from(body: B) -> Self {
        Self { body, headers: NoHeaders }
    }
}

impl<B: Body> From<(B, RequestContext)> for Request<B, RequestContext> {
    fn from((body, headers): (B, RequestContext)) -> Self {
        Self { body, headers }
    }
}

/// Top-level response data structure common to all handlers.
#[derive(Clone, Debug)]
pub struct Response<T> {
    /// Response HTTP status code.
    pub status: StatusCode,

    /// The handler-specific response.
    pub body: T,
}

impl<T> From<T> for Response<T> {
    fn from(body: T) -> Self {
        Self { status: StatusCode::OK, body }
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Request handler.
///
/// The primary role of this trait is to provide a common interface for
/// requests so they can be handled by the [`handle`] method.
pub trait Handler<U, P> {
    /// The error type returned by the handler.
    type Error;

    /// Routes the message to the concrete handler used to process the message.
    fn handle(
        self, config: &Config, provider: &P,
    ) -> impl Future<Output = Result<impl Into<Response<U>>, Self::Error>> + Send;
}

/// The `Body` trait is used to restrict the types able to implement
/// request body. It is implemented by all `xxxRequest` types.
pub trait Body: Clone + Debug + Send + Sync {}

/// The `Headers` trait is used to restrict the types able to implement
/// request headers.
pub trait Headers: Clone + Debug + Send + Sync {}

/// Implement empty headers for use by handlers that do not require headers.
#[derive(Clone, Debug)]
pub struct NoHeaders;
impl Headers for NoHeaders {}

impl Headers for RequestContext {}
