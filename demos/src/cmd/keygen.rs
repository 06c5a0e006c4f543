//! Generate issuer credentials
//!
//! Prints a configuration fragment holding a new Ed25519 issuer key and its
//! `did:key` DID.

use anyhow::Result;
use credibil_badge::proof::generate_issuer_key;
use serde_json::json;

fn main() -> Result<()> {
    let (key, did) = generate_issuer_key();
    let name = std::env::args().nth(1);

    let fragment = json!({
        "default_issuer": {
            "id": did,
            "key": key,
            "name": name,
        }
    });
    println!("{}", serde_json::to_string_pretty(&fragment)?);
    Ok(())
}
