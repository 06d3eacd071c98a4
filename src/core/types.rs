use super::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An entity the admin API addresses by a server-assigned identifier.
pub trait Identifiable {
    /// Human readable entity kind, used in error messages
    const KIND: &'static str;

    fn id(&self) -> Option<&str>;

    /// Returns the identifier or fails when the entity was never persisted.
    fn require_id(&self) -> Result<&str> {
        self.id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConsoleError::MissingId(Self::KIND.to_string()))
    }
}

/// Group as returned by `GET /admin/realms/{realm}/groups`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<GroupRepresentation>,
}

impl GroupRepresentation {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Some(id.into()),
            path: Some(format!("/{}", name)),
            name: Some(name),
            sub_groups: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Identifiable for GroupRepresentation {
    const KIND: &'static str = "Group";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Key material stored on a client after an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// SAML key attribute of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTypes {
    SamlSigning,
    SamlEncryption,
}

impl KeyTypes {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyTypes::SamlSigning => "saml.signing",
            KeyTypes::SamlEncryption => "saml.encryption",
        }
    }
}

impl fmt::Display for KeyTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyTypes {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "saml.signing" | "signing" => Ok(KeyTypes::SamlSigning),
            "saml.encryption" | "encryption" => Ok(KeyTypes::SamlEncryption),
            other => Err(ConsoleError::Validation(format!("Unknown key type '{}'", other))),
        }
    }
}

/// Archive format of an uploaded key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyStoreFormat {
    #[default]
    Jks,
    Pkcs12,
    CertificatePem,
}

impl KeyStoreFormat {
    /// Value sent as `keystoreFormat`
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStoreFormat::Jks => "JKS",
            KeyStoreFormat::Pkcs12 => "PKCS12",
            KeyStoreFormat::CertificatePem => "Certificate PEM",
        }
    }

    /// PEM uploads carry a bare certificate, no alias or passwords.
    #[inline]
    pub fn is_keystore(&self) -> bool {
        !matches!(self, KeyStoreFormat::CertificatePem)
    }
}

impl fmt::Display for KeyStoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStoreFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jks" => Ok(KeyStoreFormat::Jks),
            "pkcs12" | "p12" => Ok(KeyStoreFormat::Pkcs12),
            "certificate pem" | "pem" => Ok(KeyStoreFormat::CertificatePem),
            _ => Err(ConsoleError::Validation(format!("Unknown keystore format '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_deserializes_from_admin_json() {
        let json = r#"{
            "id": "g-1",
            "name": "ops",
            "path": "/ops",
            "subGroups": [{"id": "g-2", "name": "oncall", "path": "/ops/oncall"}]
        }"#;
        let group: GroupRepresentation = serde_json::from_str(json).unwrap();
        assert_eq!(group.id(), Some("g-1"));
        assert_eq!(group.sub_groups.len(), 1);
        assert_eq!(group.sub_groups[0].name(), Some("oncall"));
    }

    #[test]
    fn require_id_rejects_missing_and_empty_ids() {
        let group = GroupRepresentation::default();
        assert!(matches!(
            group.require_id(),
            Err(ConsoleError::MissingId(ref kind)) if kind == "Group"
        ));

        let empty = GroupRepresentation { id: Some(String::new()), ..Default::default() };
        assert!(empty.require_id().is_err());
    }

    #[test]
    fn key_types_and_formats_parse() {
        assert_eq!("signing".parse::<KeyTypes>().unwrap(), KeyTypes::SamlSigning);
        assert_eq!(KeyTypes::SamlEncryption.to_string(), "saml.encryption");
        assert_eq!("PEM".parse::<KeyStoreFormat>().unwrap(), KeyStoreFormat::CertificatePem);
        assert!(!KeyStoreFormat::CertificatePem.is_keystore());
        assert!("zip".parse::<KeyStoreFormat>().is_err());
    }
}
