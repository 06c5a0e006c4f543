//! # Issue Credential Endpoint
//!
//! Called by the wallet with the issuance line from the deep link. The
//! request data is validated against the storage's request shape before the
//! credential is composed, signed, verified and returned.

use http::StatusCode;

use crate::config::Config;
use crate::context::RequestContext;
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::issuance::CredentialIssuer;
use crate::provider::Provider;
use crate::types::{IssueCredentialRequest, IssueCredentialResponse};

async fn issue_credential<P: Provider>(
    config: &Config, ctx: &RequestContext, provider: &P, request: IssueCredentialRequest,
) -> Result<IssueCredentialResponse> {
    let mut issuer = CredentialIssuer::pickup(provider, config, &request.issuance_line_uuid).await?;
    issuer.validate(&request.data).await?;
    let credential = issuer.issue(Some(ctx)).await?;

    Ok(IssueCredentialResponse(credential))
}

impl<P: Provider> Handler<IssueCredentialResponse, P>
    for Request<IssueCredentialRequest, RequestContext>
{
    type Error = Error;

    async fn handle(
        self, config: &Config, provider: &P,
    ) -> Result<Response<IssueCredentialResponse>> {
        let body = issue_credential(config, &self.headers, provider, self.body).await?;
        Ok(Response { status: StatusCode::CREATED, body })
    }
}

impl Body for IssueCredentialRequest {}
