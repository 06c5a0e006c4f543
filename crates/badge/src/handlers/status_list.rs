//! # Status List Endpoint
//!
//! Serves an issuer's Status List 2021 credential, regenerated and signed
//! on every request.

use crate::config::Config;
use crate::context::RequestContext;
use crate::error::not_found;
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::issuance::issue_status_list;
use crate::provider::Provider;
use crate::registry;
use crate::types::{StatusListRequest, StatusListResponse};

async fn status_list<P: Provider>(
    config: &Config, ctx: &RequestContext, provider: &P, request: StatusListRequest,
) -> Result<StatusListResponse> {
    if !registry::issuer_ids(provider).await?.contains(&request.issuer_id) {
        return Err(not_found!("issuer {} not found", request.issuer_id));
    }

    let credential = issue_status_list(provider, config, &request.issuer_id, Some(ctx)).await?;
    Ok(StatusListResponse(credential))
}

impl<P: Provider> Handler<StatusListResponse, P> for Request<StatusListRequest, RequestContext> {
    type Error = Error;

    async fn handle(self, config: &Config, provider: &P) -> Result<Response<StatusListResponse>> {
        Ok(status_list(config, &self.headers, provider, self.body).await?.into())
    }
}

impl Body for StatusListRequest {}
