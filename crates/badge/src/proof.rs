//! # Linked Data Proofs
//!
//! Signs and verifies credentials using the [Ed25519Signature2020] suite.
//! Issuer keys are Ed25519 JWKs; verification methods are `did:key` URLs
//! derived from the public key.
//!
//! The signed message is `SHA-256(proof config) || SHA-256(document)`,
//! where both inputs are serialized with their object keys sorted.
//!
//! [Ed25519Signature2020]: https://w3c.github.io/vc-di-eddsa/#ed25519signature2020-0

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{SecondsFormat, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use multibase::Base;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::provider::Suite;

/// Proof type produced by [`Ed25519Signature2020`].
pub const ED25519_SIGNATURE_2020: &str = "Ed25519Signature2020";

/// Proof purpose for credentials asserted by their issuer.
pub const ASSERTION_METHOD: &str = "assertionMethod";

const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// An Ed25519 issuer key in JWK form, including the private part.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerKey {
    /// Key type. Always `OKP`.
    pub kty: String,

    /// Curve. Always `Ed25519`.
    pub crv: String,

    /// Base64url-encoded public key.
    pub x: String,

    /// Base64url-encoded private key.
    pub d: String,
}

impl IssuerKey {
    /// Create a JWK from a signing key.
    #[must_use]
    pub fn from_signing_key(signing_key: &SigningKey) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: Base64UrlUnpadded::encode_string(signing_key.verifying_key().as_bytes()),
            d: Base64UrlUnpadded::encode_string(signing_key.as_bytes()),
        }
    }

    /// The Ed25519 signing key.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWK is not an Ed25519 key or the private and
    /// public parts do not match.
    pub fn signing_key(&self) -> Result<SigningKey> {
        if self.kty != "OKP" || self.crv != "Ed25519" {
            bail!("unsupported key type {}/{}", self.kty, self.crv);
        }

        let secret = Base64UrlUnpadded::decode_vec(&self.d)
            .map_err(|e| anyhow!("issue decoding private key: {e}"))?;
        let secret: [u8; 32] =
            secret.try_into().map_err(|_| anyhow!("invalid private key length"))?;
        let signing_key = SigningKey::from_bytes(&secret);

        let public = Base64UrlUnpadded::decode_vec(&self.x)
            .map_err(|e| anyhow!("issue decoding public key: {e}"))?;
        if public.as_slice() != signing_key.verifying_key().as_bytes() {
            bail!("public key does not match private key");
        }

        Ok(signing_key)
    }

    /// The `did:key` DID for this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWK is invalid.
    pub fn did(&self) -> Result<String> {
        Ok(did_key(&self.signing_key()?.verifying_key()))
    }

    /// The `did:key` verification method URL for this key.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWK is invalid.
    pub fn verification_method(&self) -> Result<String> {
        let did = self.did()?;
        let multikey = did.trim_start_matches("did:key:");
        Ok(format!("{did}#{multikey}"))
    }
}

/// Generate a new issuer key, returning the key and its `did:key` DID.
#[must_use]
pub fn generate_issuer_key() -> (IssuerKey, String) {
    let signing_key = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
    let did = did_key(&signing_key.verifying_key());
    (IssuerKey::from_signing_key(&signing_key), did)
}

/// Options selecting and parameterizing the proof suite.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofOptions {
    /// Proof type. Defaults to `Ed25519Signature2020`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Proof purpose. Defaults to `assertionMethod`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
}

impl ProofOptions {
    /// Options for signing with `Ed25519Signature2020`.
    #[must_use]
    pub fn ed25519_2020() -> Self {
        Self { type_: Some(ED25519_SIGNATURE_2020.to_string()), proof_purpose: None }
    }
}

/// Outcome of verifying a credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerificationResult {
    /// Checks performed.
    pub checks: Vec<String>,

    /// Non-fatal findings.
    pub warnings: Vec<String>,

    /// Failed checks.
    pub errors: Vec<String>,
}

impl VerificationResult {
    /// Whether every check passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The `Ed25519Signature2020` proof suite.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Signature2020;

impl Suite for Ed25519Signature2020 {
    async fn sign(
        &self, document: &Value, options: &ProofOptions, key: &IssuerKey,
    ) -> Result<Value> {
        sign(document, options, key)
    }

    async fn verify(&self, document: &Value, options: &ProofOptions) -> Result<VerificationResult> {
        verify(document, options)
    }
}

fn sign(document: &Value, options: &ProofOptions, key: &IssuerKey) -> Result<Value> {
    let Value::Object(unsigned) = document else {
        bail!("credential must be a JSON object");
    };
    check_type(options)?;
    if unsigned.get("issuer").and_then(issuer_id).is_none() {
        bail!("credential has no issuer");
    }

    let signing_key = key.signing_key()?;
    let proof_purpose = options.proof_purpose.as_deref().unwrap_or(ASSERTION_METHOD);

    let mut proof = Map::new();
    proof.insert("type".into(), ED25519_SIGNATURE_2020.into());
    proof.insert("created".into(), Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true).into());
    proof.insert("verificationMethod".into(), key.verification_method()?.into());
    proof.insert("proofPurpose".into(), proof_purpose.into());

    let message = signing_input(unsigned, &proof);
    let signature = signing_key.sign(&message);
    let proof_value = multibase::encode(Base::Base58Btc, signature.to_bytes());
    proof.insert("proofValue".into(), proof_value.into());

    let mut signed = unsigned.clone();
    signed.insert("proof".into(), Value::Object(proof));
    Ok(Value::Object(signed))
}

fn verify(document: &Value, options: &ProofOptions) -> Result<VerificationResult> {
    let Value::Object(signed) = document else {
        bail!("credential must be a JSON object");
    };
    check_type(options)?;
    let Some(Value::Object(proof)) = signed.get("proof") else {
        bail!("credential has no proof");
    };

    let mut result = VerificationResult { checks: vec!["proof".to_string()], ..Default::default() };

    if proof.get("type").and_then(Value::as_str) != Some(ED25519_SIGNATURE_2020) {
        result.errors.push("unsupported proof type".to_string());
        return Ok(result);
    }
    if let Some(purpose) = &options.proof_purpose
        && proof.get("proofPurpose").and_then(Value::as_str) != Some(purpose.as_str())
    {
        result.errors.push(format!("proof purpose is not {purpose}"));
    }

    let Some(method) = proof.get("verificationMethod").and_then(Value::as_str) else {
        bail!("proof has no verification method");
    };
    let verifying_key = resolve_did_key(method)?;
    let did = method.split('#').next().unwrap_or_default();

    if signed.get("issuer").and_then(issuer_id) != Some(did) {
        result.errors.push("issuer does not match verification method".to_string());
    }

    let Some(proof_value) = proof.get("proofValue").and_then(Value::as_str) else {
        bail!("proof has no proof value");
    };
    let (_, sig_bytes) =
        multibase::decode(proof_value).map_err(|e| anyhow!("issue decoding proof value: {e}"))?;
    let signature = Signature::from_slice(&sig_bytes)
        .map_err(|e| anyhow!("invalid signature encoding: {e}"))?;

    let mut unsigned = signed.clone();
    unsigned.remove("proof");
    let mut config = proof.clone();
    config.remove("proofValue");

    let message = signing_input(&unsigned, &config);
    if verifying_key.verify_strict(&message, &signature).is_err() {
        result.errors.push("signature does not verify".to_string());
    }

    Ok(result)
}

fn check_type(options: &ProofOptions) -> Result<()> {
    match options.type_.as_deref() {
        None | Some(ED25519_SIGNATURE_2020) => Ok(()),
        Some(other) => bail!("unsupported proof type: {other}"),
    }
}

// proof config carries the document's context
fn signing_input(document: &Map<String, Value>, proof: &Map<String, Value>) -> Vec<u8> {
    let mut config = proof.clone();
    if let Some(context) = document.get("@context") {
        config.insert("@context".into(), context.clone());
    }

    let mut message = Sha256::digest(canonicalize(&Value::Object(config)).as_bytes()).to_vec();
    message.extend(Sha256::digest(canonicalize(&Value::Object(document.clone())).as_bytes()));
    message
}

fn issuer_id(issuer: &Value) -> Option<&str> {
    match issuer {
        Value::String(id) => Some(id),
        Value::Object(obj) => obj.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Serialize a JSON value with object keys in sorted order at every level.
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut keys = obj.keys().collect::<Vec<_>>();
            keys.sort();
            let map = keys.into_iter().map(|k| (k.clone(), sorted(&obj[k]))).collect::<Map<_, _>>();
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// The `did:key` DID for an Ed25519 public key.
#[must_use]
pub fn did_key(verifying_key: &VerifyingKey) -> String {
    let mut multi_bytes = ED25519_CODEC.to_vec();
    multi_bytes.extend_from_slice(verifying_key.as_bytes());
    format!("did:key:{}", multibase::encode(Base::Base58Btc, &multi_bytes))
}

/// Resolve the Ed25519 public key embedded in a `did:key` DID or DID URL.
///
/// # Errors
///
/// Returns an error if the DID is not an Ed25519 `did:key`.
pub fn resolve_did_key(did_url: &str) -> Result<VerifyingKey> {
    let did = did_url.split('#').next().unwrap_or_default();
    let Some(multikey) = did.strip_prefix("did:key:") else {
        bail!("unsupported DID method: {did}");
    };

    let (_, key_bytes) =
        multibase::decode(multikey).map_err(|e| anyhow!("issue decoding key: {e}"))?;
    if key_bytes.len() != 34 {
        bail!("invalid key length");
    }
    if key_bytes[0..2] != ED25519_CODEC {
        bail!("unsupported signature");
    }

    let mut public = [0u8; 32];
    public.copy_from_slice(&key_bytes[2..]);
    VerifyingKey::from_bytes(&public).map_err(|e| anyhow!("invalid public key: {e}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn credential(issuer: &str) -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": {"id": issuer, "type": "Profile"},
            "credentialSubject": {"id": "did:example:holder"}
        })
    }

    #[test]
    fn did_key_round_trip() {
        let (key, did) = generate_issuer_key();

        assert!(did.starts_with("did:key:z6Mk"));
        assert_eq!(key.did().expect("should derive did"), did);

        let method = key.verification_method().expect("should derive method");
        let resolved = resolve_did_key(&method).expect("should resolve");
        assert_eq!(resolved, key.signing_key().expect("should load key").verifying_key());
    }

    #[test]
    fn sign_then_verify() {
        let (key, did) = generate_issuer_key();
        let signed = sign(&credential(&did), &ProofOptions::ed25519_2020(), &key)
            .expect("should sign");

        assert_eq!(signed["proof"]["type"], "Ed25519Signature2020");
        assert_eq!(signed["proof"]["proofPurpose"], "assertionMethod");
        assert!(signed["proof"]["proofValue"].as_str().is_some_and(|v| v.starts_with('z')));

        let result = verify(&signed, &ProofOptions::default()).expect("should verify");
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn tampered() {
        let (key, did) = generate_issuer_key();
        let mut signed = sign(&credential(&did), &ProofOptions::default(), &key)
            .expect("should sign");
        signed["credentialSubject"]["id"] = json!("did:example:mallory");

        let result = verify(&signed, &ProofOptions::default()).expect("should verify");
        assert_eq!(result.errors, vec!["signature does not verify"]);
    }

    #[test]
    fn wrong_issuer() {
        let (key, _) = generate_issuer_key();
        let signed = sign(&credential("did:example:other"), &ProofOptions::default(), &key)
            .expect("should sign");

        let result = verify(&signed, &ProofOptions::default()).expect("should verify");
        assert_eq!(result.errors, vec!["issuer does not match verification method"]);
    }

    #[test]
    fn malformed_input() {
        let (key, _) = generate_issuer_key();

        assert!(sign(&json!("not an object"), &ProofOptions::default(), &key).is_err());
        assert!(sign(&json!({"type": []}), &ProofOptions::default(), &key).is_err());

        let options = ProofOptions {
            type_: Some("RsaSignature2018".to_string()),
            ..ProofOptions::default()
        };
        assert!(sign(&credential("did:example:1"), &options, &key).is_err());

        let bad_key = IssuerKey { d: key.x.clone(), ..key };
        assert!(sign(&credential("did:example:1"), &ProofOptions::default(), &bad_key).is_err());
    }

    #[test]
    fn canonical_order() {
        let value = json!({"b": 1, "a": {"d": [{"z": 1, "y": 2}], "c": null}});
        assert_eq!(canonicalize(&value), r#"{"a":{"c":null,"d":[{"y":2,"z":1}]},"b":1}"#);
    }
}
