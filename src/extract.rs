//! Field extraction: turns a result mapping into an ordered list of artifacts.

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::{json_type_name, CertSplitError, Result};
use base64::{
    alphabet,
    engine::{general_purpose, GeneralPurpose},
    Engine,
};
use log::{debug, warn};
use serde_json::{Map, Value};

/// A top-level string field and the names it may appear under, primary first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub kind: ArtifactKind,
    pub names: &'static [&'static str],
}

pub const CERTIFICATE: FieldRule = FieldRule {
    kind: ArtifactKind::Certificate,
    names: &["cert", "certificate"],
};

pub const PRIVATE_KEY: FieldRule = FieldRule {
    kind: ArtifactKind::PrivateKey,
    names: &["key", "private_key"],
};

pub const ENCRYPTED_KEY: FieldRule = FieldRule {
    kind: ArtifactKind::EncryptedKey,
    names: &["encrypted_key"],
};

pub const CERTIFICATE_REQUEST: FieldRule = FieldRule {
    kind: ArtifactKind::CertificateRequest,
    names: &["csr", "certificate_request"],
};

/// Standard padded base64 that tolerates non-zero trailing bits.
const OCSP_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_allow_trailing_bits(true),
);

pub const OCSP_RESPONSE: FieldRule = FieldRule {
    kind: ArtifactKind::OcspResponse,
    names: &["ocspResponse"],
};

impl FieldRule {
    /// Find the first present name and return it with its string value.
    ///
    /// A later name is never consulted once an earlier one is present, even
    /// when the earlier value is empty. `null` counts as absent, so the next
    /// name is tried.
    pub fn lookup<'a>(&self, fields: &'a Map<String, Value>) -> Result<Option<(&'static str, &'a str)>> {
        let Some((name, value)) = self
            .names
            .iter()
            .find_map(|name| {
                fields
                    .get(*name)
                    .filter(|value| !value.is_null())
                    .map(|value| (*name, value))
            })
        else {
            return Ok(None);
        };

        match value {
            Value::String(text) => Ok(Some((name, text.as_str()))),
            other => Err(CertSplitError::TypeMismatch {
                field: name.to_string(),
                expected: "a string",
                found: json_type_name(other),
            }),
        }
    }

    /// Like [`lookup`](Self::lookup), but skips empty strings.
    fn non_empty<'a>(&self, fields: &'a Map<String, Value>) -> Result<Option<&'a str>> {
        match self.lookup(fields)? {
            Some((name, "")) => {
                warn!("Field \"{}\" is empty, no {} written", name, self.kind);
                Ok(None)
            }
            Some((_, text)) => Ok(Some(text)),
            None => Ok(None),
        }
    }
}

/// The certificate chain and root nested under `result.bundle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePair {
    pub bundle: String,
    pub root: String,
}

impl BundlePair {
    /// Locate `result.bundle` inside the mapping.
    ///
    /// Anything other than two nested objects means no bundle was returned.
    /// Once the inner object exists, both `bundle` and `root` must be strings.
    pub fn find(fields: &Map<String, Value>) -> Result<Option<Self>> {
        let Some(Value::Object(inner)) = fields
            .get("result")
            .and_then(Value::as_object)
            .and_then(|result| result.get("bundle"))
        else {
            return Ok(None);
        };

        let bundle = required_string(inner, "bundle")?;
        let root = required_string(inner, "root")?;

        Ok(Some(Self {
            bundle: bundle.to_string(),
            root: root.to_string(),
        }))
    }

    /// Chain followed by the root, newline separated.
    pub fn full_chain(&self) -> String {
        format!("{}\n{}", self.bundle, self.root)
    }
}

fn required_string<'a>(bundle: &'a Map<String, Value>, field: &'static str) -> Result<&'a str> {
    bundle
        .get(field)
        .and_then(Value::as_str)
        .ok_or(CertSplitError::BundleParse { field })
}

/// Produce every artifact present in `fields`, in emission order.
///
/// Fails on the first malformed field; no partial list is returned.
pub fn extract_artifacts(base_name: &str, fields: &Map<String, Value>) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    if let Some(cert) = CERTIFICATE.non_empty(fields)? {
        artifacts.push(Artifact::text(ArtifactKind::Certificate, base_name, cert));
    }

    if let Some(key) = PRIVATE_KEY.non_empty(fields)? {
        artifacts.push(Artifact::text(ArtifactKind::PrivateKey, base_name, key));
    }

    if let Some(encrypted_key) = ENCRYPTED_KEY.non_empty(fields)? {
        artifacts.push(Artifact::binary(
            ArtifactKind::EncryptedKey,
            base_name,
            encrypted_key.as_bytes().to_vec(),
        ));
    }

    if let Some(csr) = CERTIFICATE_REQUEST.non_empty(fields)? {
        artifacts.push(Artifact::text(ArtifactKind::CertificateRequest, base_name, csr));
    }

    if let Some(pair) = BundlePair::find(fields)? {
        artifacts.push(Artifact::text(ArtifactKind::Bundle, base_name, pair.full_chain()));
        artifacts.push(Artifact::text(ArtifactKind::Root, base_name, pair.root));
    }

    if let Some((name, encoded)) = OCSP_RESPONSE.lookup(fields)? {
        // Wrapped base64 is common; line breaks carry no data.
        let compact: String = encoded.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        let der = OCSP_ENGINE
            .decode(compact)
            .map_err(|e| CertSplitError::Base64Decode { field: name, source: e })?;
        artifacts.push(Artifact::binary(ArtifactKind::OcspResponse, base_name, der));
    }

    for artifact in &artifacts {
        debug!(
            "Extracted {} as {} ({} bytes)",
            artifact.kind,
            artifact.filename,
            artifact.contents.len()
        );
    }

    Ok(artifacts)
}
