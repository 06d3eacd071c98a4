//! Shared form state for dialog forms.
//!
//! A parent dialog owns the values; child forms get a [`FormHandle`] and can
//! only read the current values or write updates through it.

use crate::admin::KeyUpload;
use crate::core::{KeyStoreFormat, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{Level, event};

/// Cloneable read/write handle onto form values.
pub struct FormHandle<T> {
    values: Arc<Mutex<T>>,
}

impl<T> Clone for FormHandle<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T: Default> Default for FormHandle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> FormHandle<T> {
    pub fn new(values: T) -> Self {
        Self {
            values: Arc::new(Mutex::new(values)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies a field update in place.
    pub fn update<R>(&self, write: impl FnOnce(&mut T) -> R) -> R {
        let mut values = self.lock();
        write(&mut *values)
    }

    pub fn set_values(&self, values: T) {
        *self.lock() = values;
    }
}

impl<T: Clone> FormHandle<T> {
    /// Snapshot of the current values
    pub fn values(&self) -> T {
        self.lock().clone()
    }
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Values that know how to check themselves before submit.
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), FieldErrors>;
}

impl<T: Clone + Validate> FormHandle<T> {
    /// Validates the current values and hands them to `on_valid` only when
    /// every field passes.
    pub async fn handle_submit<F, Fut>(
        &self,
        on_valid: F,
    ) -> std::result::Result<Fut::Output, FieldErrors>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future,
    {
        let values = self.values();
        if let Err(errors) = values.validate() {
            event!(Level::WARN, errors = %errors, "form submission rejected");
            return Err(errors);
        }
        Ok(on_valid(values).await)
    }
}

/// Values of the SAML key import dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlKeysDialogForm {
    pub format: KeyStoreFormat,
    pub key_alias: String,
    pub key_password: String,
    pub store_password: String,
    pub file_name: String,
    pub file: Vec<u8>,
}

impl SamlKeysDialogForm {
    /// Builds the upload payload. PEM uploads drop alias and passwords.
    pub fn into_upload(self) -> KeyUpload {
        let keystore = self.format.is_keystore();
        let keep = |value: String| (keystore && !value.is_empty()).then_some(value);

        KeyUpload {
            keystore_format: self.format,
            key_alias: keep(self.key_alias),
            key_password: keep(self.key_password),
            store_password: keep(self.store_password),
            file_name: self.file_name,
            file: self.file,
        }
    }
}

impl Validate for SamlKeysDialogForm {
    fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.file.is_empty() {
            errors.add("file", "Required field");
        }
        if self.format.is_keystore() {
            let required = [
                ("keyAlias", &self.key_alias),
                ("keyPassword", &self.key_password),
                ("storePassword", &self.store_password),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    errors.add(field, "Required field");
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Key fields of a key dialog, editing the parent's form through its handle.
pub struct KeyForm {
    form: FormHandle<SamlKeysDialogForm>,
    use_file: bool,
    has_pem: bool,
}

impl KeyForm {
    pub fn new(form: FormHandle<SamlKeysDialogForm>) -> Self {
        Self {
            form,
            use_file: false,
            has_pem: false,
        }
    }

    /// Take the key material from a file on disk
    pub fn use_file(mut self) -> Self {
        self.use_file = true;
        self
    }

    /// Offer the `Certificate PEM` format
    pub fn has_pem(mut self) -> Self {
        self.has_pem = true;
        self
    }

    /// Formats the user may pick from
    pub fn formats(&self) -> Vec<KeyStoreFormat> {
        let mut formats = vec![KeyStoreFormat::Jks, KeyStoreFormat::Pkcs12];
        if self.has_pem {
            formats.push(KeyStoreFormat::CertificatePem);
        }
        formats
    }

    pub fn select_format(&self, format: KeyStoreFormat) -> Result<()> {
        if !self.formats().contains(&format) {
            return Err(crate::core::ConsoleError::Validation(format!(
                "Format '{}' is not offered here",
                format
            )));
        }
        self.form.update(|values| values.format = format);
        Ok(())
    }

    pub fn set_key_alias(&self, alias: &str) {
        self.form.update(|values| values.key_alias = alias.to_string());
    }

    pub fn set_key_password(&self, password: &str) {
        self.form.update(|values| values.key_password = password.to_string());
    }

    pub fn set_store_password(&self, password: &str) {
        self.form.update(|values| values.store_password = password.to_string());
    }

    /// Reads the key file into the form.
    pub async fn load_file(&self, path: &Path) -> Result<()> {
        if !self.use_file {
            return Err(crate::core::ConsoleError::Validation(
                "This form does not take a file".to_string(),
            ));
        }

        let file = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "keystore".to_string());

        event!(Level::DEBUG, file = %file_name, bytes = file.len(), "key file loaded");
        self.form.update(|values| {
            values.file_name = file_name;
            values.file = file;
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keystore_form() -> SamlKeysDialogForm {
        SamlKeysDialogForm {
            format: KeyStoreFormat::Jks,
            key_alias: "saml".to_string(),
            key_password: "kp".to_string(),
            store_password: "sp".to_string(),
            file_name: "keystore.jks".to_string(),
            file: vec![0xfe, 0xed, 0xfe, 0xed],
        }
    }

    #[test]
    fn child_edits_are_visible_to_parent() {
        let parent = FormHandle::<SamlKeysDialogForm>::default();
        let child = KeyForm::new(parent.clone()).has_pem();

        child.select_format(KeyStoreFormat::CertificatePem).unwrap();
        child.set_key_alias("signing");

        let values = parent.values();
        assert_eq!(values.format, KeyStoreFormat::CertificatePem);
        assert_eq!(values.key_alias, "signing");
    }

    #[test]
    fn pem_is_offered_only_when_requested() {
        let form = KeyForm::new(FormHandle::default());
        assert_eq!(form.formats(), vec![KeyStoreFormat::Jks, KeyStoreFormat::Pkcs12]);
        assert!(form.select_format(KeyStoreFormat::CertificatePem).is_err());
    }

    #[test]
    fn keystore_formats_require_alias_and_passwords() {
        let mut values = keystore_form();
        values.key_alias.clear();
        values.store_password = "  ".to_string();
        values.file.clear();

        let errors = values.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("keyAlias"), Some("Required field"));
        assert_eq!(errors.get("storePassword"), Some("Required field"));
        assert_eq!(errors.get("file"), Some("Required field"));
        assert_eq!(errors.get("keyPassword"), None);
    }

    #[test]
    fn pem_only_requires_the_file() {
        let values = SamlKeysDialogForm {
            format: KeyStoreFormat::CertificatePem,
            file: b"-----BEGIN CERTIFICATE-----".to_vec(),
            ..Default::default()
        };
        assert!(values.validate().is_ok());
    }

    #[test]
    fn pem_upload_drops_keystore_fields() {
        let mut values = keystore_form();
        values.format = KeyStoreFormat::CertificatePem;

        let upload = values.into_upload();
        assert_eq!(upload.key_alias, None);
        assert_eq!(upload.store_password, None);
        assert_eq!(upload.file_name, "keystore.jks");
    }

    #[tokio::test]
    async fn handle_submit_skips_callback_on_invalid_values() {
        let form = FormHandle::new(SamlKeysDialogForm::default());
        let result = form.handle_submit(|_| async { "submitted" }).await;
        assert!(result.is_err());

        form.set_values(keystore_form());
        let result = form.handle_submit(|values| async move { values.key_alias }).await;
        assert_eq!(result, Ok("saml".to_string()));
    }

    #[tokio::test]
    async fn load_file_needs_use_file() {
        let form = KeyForm::new(FormHandle::default());
        assert!(form.load_file(Path::new("/does/not/matter")).await.is_err());
    }
}
