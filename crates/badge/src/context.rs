//! # Request Context
//!
//! Absolute URLs embedded in credentials (status list references, wallet
//! request URLs) depend on the base URL of the request being served. The
//! context is passed explicitly; operations running outside a request
//! receive `None` and omit those URLs.

use uuid::Uuid;

use crate::config::Routes;

/// The request currently being served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme and authority of the request, e.g. `https://credentials.example.com`.
    pub base_url: String,
}

impl RequestContext {
    /// Create a context for the given base URL. A trailing slash is
    /// removed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// URL of the issuer's status list credential.
    #[must_use]
    pub fn status_list_url(&self, routes: &Routes, issuer_id: &str) -> String {
        self.join(&routes.status_list.replace("{issuer_id}", issuer_id))
    }

    /// URL a wallet posts its request to for the given issuance line.
    #[must_use]
    pub fn issue_url(&self, routes: &Routes, line_uuid: &Uuid) -> String {
        self.join(&routes.issue.replace("{uuid}", &line_uuid.to_string()))
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        let ctx = RequestContext::new("https://credentials.example.com/");
        let routes = Routes::default();

        let base = "https://credentials.example.com/verifiable_credentials/api/v1";

        assert_eq!(
            ctx.status_list_url(&routes, "did:key:z6Mk"),
            format!("{base}/status-list/2021/v1/did:key:z6Mk/")
        );

        let uuid = Uuid::nil();
        assert_eq!(
            ctx.issue_url(&routes, &uuid),
            format!("{base}/credentials/issue/00000000-0000-0000-0000-000000000000/")
        );
    }
}
