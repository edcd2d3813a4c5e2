use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("malformed certificate: {0}")]
    Malformed(String),
}

/// Parsed view of an uploaded certificate's `key=value` text. Only the
/// original text is ever kept by the user; this struct is transient.
#[derive(Debug, Clone)]
pub struct CertificatePayload {
    fields: HashMap<String, String>,
}

impl CertificatePayload {
    /// Split on line boundaries and collect `key=value` tokens. Malformed
    /// lines are ignored; absence of expected keys is signaled by absence
    /// in the result. Never fails on arbitrary input.
    pub fn parse(text: &str) -> Self {
        let mut fields = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            fields.insert(key.to_string(), value.trim().to_string());
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn certificate_id(&self) -> Option<&str> {
        self.get("certificate-id")
    }

    /// Device id embedded at issuance, if the certificate carries one.
    pub fn device_id(&self) -> Option<&str> {
        self.get("device-id")
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.get("parent-id")
    }

    pub fn issued_to(&self) -> Option<&str> {
        self.get("issued-to")
    }

    pub fn issued_at(&self) -> Option<&str> {
        self.get("issued-at")
    }

    /// Resolve the certificate identifier: the embedded field wins, then
    /// the uploaded filename. Callers that need an id and get `None` treat
    /// that as `Malformed`.
    pub fn resolve_certificate_id(&self, filename: Option<&str>) -> Option<String> {
        if let Some(id) = self.certificate_id() {
            return Some(id.to_string());
        }
        filename.and_then(certificate_id_from_filename)
    }
}

/// Derive a certificate id from an uploaded filename: strip the extension;
/// if the stem contains `_`, take the prefix before the first one.
pub fn certificate_id_from_filename(name: &str) -> Option<String> {
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };
    let id = match stem.split_once('_') {
        Some((prefix, _)) => prefix,
        None => stem,
    };
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
