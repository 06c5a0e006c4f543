//! # Storages Endpoint
//!
//! Lists the storages users can choose between.

use crate::config::Config;
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::provider::Provider;
use crate::types::{StorageInfo, StoragesRequest, StoragesResponse};

fn storages(config: &Config) -> StoragesResponse {
    let infos = config
        .available_storages()
        .iter()
        .map(|s| StorageInfo { id: s.id().to_string(), name: s.name().to_string() })
        .collect();
    StoragesResponse(infos)
}

impl<P: Provider> Handler<StoragesResponse, P> for Request<StoragesRequest> {
    type Error = Error;

    async fn handle(self, config: &Config, _: &P) -> Result<Response<StoragesResponse>> {
        Ok(storages(config).into())
    }
}

impl Body for StoragesRequest {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::DataModel;
    use crate::storage::{Storage, WebWallet};

    #[test]
    fn excludes_status_list() {
        let mut config = Config::default();
        config.storages.push(Storage::WebWallet(WebWallet {
            id: "web".to_string(),
            name: "Web Wallet".to_string(),
            url: "https://wallet.example.com".to_string(),
            data_model: DataModel::VerifiableCredentials,
        }));

        let StoragesResponse(infos) = storages(&config);
        let ids = infos.iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["lc_wallet", "web"]);
    }
}
