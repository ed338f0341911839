use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

/// The kinds of artifact a response can carry, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Certificate,
    PrivateKey,
    EncryptedKey,
    CertificateRequest,
    Bundle,
    Root,
    OcspResponse,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::Certificate,
        ArtifactKind::PrivateKey,
        ArtifactKind::EncryptedKey,
        ArtifactKind::CertificateRequest,
        ArtifactKind::Bundle,
        ArtifactKind::Root,
        ArtifactKind::OcspResponse,
    ];

    /// Appended to the base name to form the output filename.
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Certificate => ".pem",
            ArtifactKind::PrivateKey => "-key.pem",
            ArtifactKind::EncryptedKey => "-key.enc",
            ArtifactKind::CertificateRequest => ".csr",
            ArtifactKind::Bundle => "-bundle.pem",
            ArtifactKind::Root => "-root.pem",
            ArtifactKind::OcspResponse => "-response.der",
        }
    }

    /// Unix permission bits for the written file.
    pub fn mode(self) -> u32 {
        match self {
            ArtifactKind::Certificate => 0o664,
            ArtifactKind::PrivateKey | ArtifactKind::EncryptedKey => 0o600,
            ArtifactKind::CertificateRequest
            | ArtifactKind::Bundle
            | ArtifactKind::Root
            | ArtifactKind::OcspResponse => 0o644,
        }
    }

    pub fn is_binary(self) -> bool {
        matches!(self, ArtifactKind::EncryptedKey | ArtifactKind::OcspResponse)
    }

    pub fn filename(self, base_name: &str) -> String {
        format!("{}{}", base_name, self.suffix())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Certificate => "certificate",
            ArtifactKind::PrivateKey => "private key",
            ArtifactKind::EncryptedKey => "encrypted key",
            ArtifactKind::CertificateRequest => "certificate request",
            ArtifactKind::Bundle => "certificate bundle",
            ArtifactKind::Root => "root certificate",
            ArtifactKind::OcspResponse => "OCSP response",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Binary(Vec<u8>),
}

impl Contents {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Contents::Text(text) => text.as_bytes(),
            Contents::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Text form for stdout and JSON output; binary data is base64 encoded.
    pub fn to_printable(&self) -> String {
        match self {
            Contents::Text(text) => text.clone(),
            Contents::Binary(bytes) => STANDARD.encode(bytes),
        }
    }
}

/// One named output produced from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub filename: String,
    pub contents: Contents,
    pub mode: u32,
}

impl Artifact {
    pub fn text<S: Into<String>>(kind: ArtifactKind, base_name: &str, contents: S) -> Self {
        Self::with_contents(kind, base_name, Contents::Text(contents.into()))
    }

    pub fn binary(kind: ArtifactKind, base_name: &str, contents: Vec<u8>) -> Self {
        Self::with_contents(kind, base_name, Contents::Binary(contents))
    }

    fn with_contents(kind: ArtifactKind, base_name: &str, contents: Contents) -> Self {
        Self {
            kind,
            filename: kind.filename(base_name),
            contents,
            mode: kind.mode(),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.contents, Contents::Binary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filenames_follow_base_name() {
        let names: Vec<String> = ArtifactKind::ALL
            .iter()
            .map(|kind| kind.filename("ca"))
            .collect();

        assert_eq!(
            names,
            vec![
                "ca.pem",
                "ca-key.pem",
                "ca-key.enc",
                "ca.csr",
                "ca-bundle.pem",
                "ca-root.pem",
                "ca-response.der",
            ]
        );
    }

    #[test]
    fn test_key_material_is_private() {
        assert_eq!(ArtifactKind::PrivateKey.mode(), 0o600);
        assert_eq!(ArtifactKind::EncryptedKey.mode(), 0o600);
        assert_eq!(ArtifactKind::Certificate.mode(), 0o664);
        assert_eq!(ArtifactKind::OcspResponse.mode(), 0o644);
    }

    #[test]
    fn test_binary_kinds() {
        let binary: Vec<ArtifactKind> = ArtifactKind::ALL
            .into_iter()
            .filter(|kind| kind.is_binary())
            .collect();
        assert_eq!(binary, vec![ArtifactKind::EncryptedKey, ArtifactKind::OcspResponse]);
    }

    #[test]
    fn test_binary_contents_print_as_base64() {
        let artifact = Artifact::binary(ArtifactKind::OcspResponse, "cert", vec![0x30, 0x03]);
        assert!(artifact.is_binary());
        assert_eq!(artifact.contents.to_printable(), "MAM=");

        let decoded = STANDARD.decode(artifact.contents.to_printable()).unwrap();
        assert_eq!(decoded, vec![0x30, 0x03]);
    }

    #[test]
    fn test_text_contents_print_verbatim() {
        let artifact = Artifact::text(ArtifactKind::Certificate, "cert", "CERTDATA");
        assert!(!artifact.is_binary());
        assert_eq!(artifact.filename, "cert.pem");
        assert_eq!(artifact.contents.to_printable(), "CERTDATA");
        assert_eq!(artifact.contents.len(), 8);
    }
}
