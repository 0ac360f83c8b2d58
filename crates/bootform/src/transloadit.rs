//! Transloadit uploads.
//!
//! Files are uploaded to Transloadit straight from the browser. The form
//! carries signed assembly parameters in a hidden `transloadit` field; on
//! submit the same field holds the assembly results as JSON. A
//! [`TransloaditMapping`] unpacks those results into the submitted values
//! before the form is validated, so uploaded file URLs validate like any
//! other input.
//!
//! ```
//! use bootform::transloadit::{image_field, transloadit_field, TransloaditMapping, TransloaditSettings};
//! use bootform::widgets::TransloaditImageWidget;
//! use bootform::{Cstruct, Field};
//!
//! let settings = TransloaditSettings::from_settings([
//!     ("transloadit.auth_key", "key"),
//!     ("transloadit.auth_secret", "secret"),
//!     ("transloadit.template_id", "tpl"),
//! ]);
//! let config = settings.sign("template_id", "/profile").unwrap();
//!
//! let form = Field::form("profile")
//!     .child(transloadit_field(config.clone()))
//!     .child(image_field("logo", TransloaditImageWidget::new(config), false))
//!     .unpacker(TransloaditMapping::new().single("logo", "logo"));
//!
//! let results = r#"{
//!     "uploads": [{"id": "u1", "field": "logo"}],
//!     "results": {"small": [{"id": "r1", "original_id": "u1", "field": "logo", "url": "http://cdn.example.com/s.png"}]}
//! }"#;
//! let pstruct = Cstruct::map([("transloadit", results)]);
//! let err = form.validate(&pstruct).unwrap_err();
//!
//! // Only the small variant was uploaded.
//! assert!(err.get("logo.small").is_none());
//! assert!(err.get("logo.large").is_some());
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use tracing::{debug, warn};

use crate::cstruct::Cstruct;
use crate::error::{FormError, Result};
use crate::field::{Field, Unpacker};
use crate::preparers::url_preparer;
use crate::validation::UrlValidator;
use crate::widgets::{
    HiddenWidget, TransloaditConfigWidget, TransloaditImageWidget, TransloaditUploadWidget,
};

/// Name of the hidden field carrying the assembly parameters and results.
pub const TRANSLOADIT_FIELD: &str = "transloadit";

/// Settings key of the template used when a form names none.
pub const DEFAULT_TEMPLATE_KEY: &str = "template_id";

/// Encoded variants stored for every uploaded image.
pub const IMAGE_VARIANTS: [&str; 4] = ["small", "medium", "large", "original"];

/// Key of the single value stored for a generic upload.
pub const UPLOAD_URL: &str = "url";

const SETTINGS_PREFIX: &str = "transloadit.";
const EXPIRES_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

type HmacSha1 = Hmac<Sha1>;

/// Uploaded files by form field; each file maps variant name to URL.
pub type UploadedFiles = BTreeMap<String, Vec<BTreeMap<String, String>>>;

/// Transloadit account settings.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransloaditSettings {
    /// Public auth key.
    pub auth_key: String,
    /// Secret used to sign assembly parameters.
    pub auth_secret: String,
    /// Template ids by settings key.
    pub templates: BTreeMap<String, String>,
}

impl std::fmt::Debug for TransloaditSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransloaditSettings")
            .field("auth_key", &self.auth_key)
            .field("auth_secret", &"<redacted>")
            .field("templates", &self.templates)
            .finish()
    }
}

impl TransloaditSettings {
    /// Creates settings for one account.
    pub fn new(auth_key: impl Into<String>, auth_secret: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
            auth_secret: auth_secret.into(),
            templates: BTreeMap::new(),
        }
    }

    /// Registers a template id under a settings key.
    #[must_use]
    pub fn template(mut self, key: impl Into<String>, template_id: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template_id.into());
        self
    }

    /// Reads flat `transloadit.*` settings, ignoring every other key.
    ///
    /// `transloadit.auth_key` and `transloadit.auth_secret` are the account
    /// credentials; any other `transloadit.<key>` is a template id.
    pub fn from_settings<I, K, V>(settings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut out = Self::default();
        for (name, value) in settings {
            let Some(key) = name.as_ref().strip_prefix(SETTINGS_PREFIX) else {
                continue;
            };
            match key {
                "auth_key" => out.auth_key = value.into(),
                "auth_secret" => out.auth_secret = value.into(),
                other => {
                    out.templates.insert(other.to_string(), value.into());
                }
            }
        }
        out
    }

    /// Returns the template id registered under `key`.
    pub fn template_id(&self, key: &str) -> Result<&str> {
        self.templates
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| FormError::Config(format!("no transloadit template for `{key}`")))
    }

    /// Signs assembly parameters that expire one day from now.
    pub fn sign(&self, template_key: &str, redirect_url: &str) -> Result<SignedConfig> {
        self.sign_at(template_key, redirect_url, Utc::now())
    }

    /// Signs assembly parameters that expire one day after `now`.
    pub fn sign_at(
        &self,
        template_key: &str,
        redirect_url: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedConfig> {
        if self.auth_key.is_empty() || self.auth_secret.is_empty() {
            return Err(FormError::Config(
                "transloadit credentials are not configured".to_string(),
            ));
        }
        let params = AssemblyParams {
            auth: AssemblyAuth {
                key: &self.auth_key,
                expires: (now + Duration::days(1)).format(EXPIRES_FORMAT).to_string(),
            },
            template_id: self.template_id(template_key)?,
            redirect_url,
        };
        let params = serde_json::to_string(&params)?;
        let signature = sign(&self.auth_secret, &params)?;
        debug!(template_key, "signed transloadit params");
        Ok(SignedConfig { params, signature })
    }
}

#[derive(Serialize)]
struct AssemblyParams<'a> {
    auth: AssemblyAuth<'a>,
    template_id: &'a str,
    redirect_url: &'a str,
}

#[derive(Serialize)]
struct AssemblyAuth<'a> {
    key: &'a str,
    expires: String,
}

/// Assembly parameters and their signature, as posted to Transloadit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedConfig {
    /// JSON encoded parameters.
    pub params: String,
    /// Hex HMAC-SHA1 of `params`.
    pub signature: String,
}

/// Returns the hex HMAC-SHA1 of `message` keyed by `secret`.
pub fn sign(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|err| FormError::Config(err.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Rewrites `http://` URLs to `https://`.
pub fn secure_url(url: &str) -> String {
    url.strip_prefix("http://")
        .map_or_else(|| url.to_string(), |rest| format!("https://{rest}"))
}

#[derive(Default, Deserialize)]
struct Assembly {
    #[serde(default)]
    uploads: Vec<Upload>,
    #[serde(default)]
    results: BTreeMap<String, Vec<ResultItem>>,
}

#[derive(Deserialize)]
struct Upload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    field: String,
}

#[derive(Deserialize)]
struct ResultItem {
    #[serde(default)]
    original_id: Option<String>,
    #[serde(default)]
    field: String,
    #[serde(default)]
    url: String,
}

/// Groups assembly results by form field.
///
/// Result steps named `:small`, `::small` and so on all land in `small`.
/// Files keep the order of the uploads (matched through `original_id`);
/// results without a known upload keep their order within the step. URLs
/// are rewritten to `https`. Empty or unreadable data yields no files.
pub fn parse_results(data: &str) -> UploadedFiles {
    if data.trim().is_empty() {
        return UploadedFiles::new();
    }
    let assembly: Assembly = match serde_json::from_str(data) {
        Ok(assembly) => assembly,
        Err(err) => {
            warn!(%err, "ignoring unreadable transloadit data");
            return UploadedFiles::new();
        }
    };

    let mut upload_index: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for upload in &assembly.uploads {
        let ids = upload_index.entry(upload.field.as_str()).or_default();
        let next = ids.len();
        ids.entry(upload.id.as_str()).or_insert(next);
    }

    let mut files = UploadedFiles::new();
    for (step, items) in &assembly.results {
        let variant = step.trim_start_matches(':');
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for item in items {
            let position = seen.entry(item.field.as_str()).or_insert(0);
            let index = item
                .original_id
                .as_deref()
                .and_then(|id| upload_index.get(item.field.as_str())?.get(id).copied())
                .unwrap_or(*position);
            *position += 1;

            let entries = files.entry(item.field.clone()).or_default();
            if entries.len() <= index {
                entries.resize_with(index + 1, BTreeMap::new);
            }
            entries[index].insert(variant.to_string(), secure_url(&item.url));
        }
    }
    debug!(fields = files.len(), "parsed transloadit results");
    files
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Single(String),
    Sequence(String),
}

/// Where uploaded files go in the submitted values.
#[derive(Debug, Clone, Default)]
pub struct TransloaditMapping {
    targets: Vec<(String, Target)>,
}

impl TransloaditMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the first file uploaded through `upload_field` at `path`.
    #[must_use]
    pub fn single(mut self, path: impl Into<String>, upload_field: impl Into<String>) -> Self {
        self.targets
            .push((path.into(), Target::Single(upload_field.into())));
        self
    }

    /// Stores every file uploaded through `upload_field` at `path`.
    ///
    /// A path of the form `items.*.key` fills the `key` of each entry of
    /// the `items` sequence whose `key` is still empty, in order.
    #[must_use]
    pub fn sequence(mut self, path: impl Into<String>, upload_field: impl Into<String>) -> Self {
        self.targets
            .push((path.into(), Target::Sequence(upload_field.into())));
        self
    }

    /// Removes the `transloadit` entry and stores its files in `pstruct`.
    pub fn apply(&self, mut pstruct: Cstruct) -> Cstruct {
        let data = pstruct.take(TRANSLOADIT_FIELD);
        let Some(raw) = data.as_str().filter(|raw| !raw.is_empty()) else {
            return pstruct;
        };
        let files = parse_results(raw);

        for (path, target) in &self.targets {
            match target {
                Target::Single(upload) => {
                    if let Some(first) = files.get(upload).and_then(|f| f.first()) {
                        pstruct.set_path(path, file_cstruct(first));
                    }
                }
                Target::Sequence(upload) => {
                    let uploaded: Vec<Cstruct> = files
                        .get(upload)
                        .map(|f| f.iter().map(file_cstruct).collect())
                        .unwrap_or_default();
                    match path.split_once(".*.") {
                        Some((items, key)) => fill_empty(&mut pstruct, items, key, uploaded),
                        None => pstruct.set_path(path, Cstruct::Seq(uploaded)),
                    }
                }
            }
        }
        pstruct
    }
}

impl Unpacker for TransloaditMapping {
    fn unpack(&self, pstruct: Cstruct) -> Cstruct {
        self.apply(pstruct)
    }
}

fn file_cstruct(file: &BTreeMap<String, String>) -> Cstruct {
    Cstruct::map(file.iter().map(|(k, v)| (k.clone(), v.clone())))
}

fn fill_empty(pstruct: &mut Cstruct, items_path: &str, key: &str, uploaded: Vec<Cstruct>) {
    let Cstruct::Seq(items) = pstruct.get_path(items_path).clone() else {
        return;
    };
    let mut uploaded = uploaded.into_iter();
    let items = items
        .into_iter()
        .map(|mut item| {
            if item.get(key).is_empty() {
                if let Some(file) = uploaded.next() {
                    item.set_path(key, file);
                }
            }
            item
        })
        .collect();
    pstruct.set_path(items_path, Cstruct::Seq(items));
}

/// Builds the hidden `transloadit` field that posts the signed parameters.
pub fn transloadit_field(config: SignedConfig) -> Field {
    Field::new(TRANSLOADIT_FIELD, TransloaditConfigWidget::new(config)).missing(Cstruct::Null)
}

/// Builds an image field holding one URL per [`IMAGE_VARIANTS`] entry.
pub fn image_field(name: impl Into<String>, widget: TransloaditImageWidget, optional: bool) -> Field {
    IMAGE_VARIANTS
        .iter()
        .fold(Field::new(name, widget), |field, variant| {
            field.child(url_field(variant, optional))
        })
}

/// Builds an upload field holding the uploaded file's URL.
pub fn upload_field(name: impl Into<String>, widget: TransloaditUploadWidget, optional: bool) -> Field {
    Field::new(name, widget).child(url_field(UPLOAD_URL, optional))
}

fn url_field(name: &str, optional: bool) -> Field {
    let field = Field::new(name, HiddenWidget)
        .preparer(url_preparer)
        .validator(UrlValidator::new());
    if optional {
        field.missing(Cstruct::Null)
    } else {
        field.required()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn assembly() -> String {
        json!({
            "uploads": [
                {"id": "a1", "field": "a"},
                {"id": "a2", "field": "a"},
                {"id": "b1", "field": "b"}
            ],
            "results": {
                "small": [
                    {"original_id": "a2", "field": "a", "url": "http://a.com/small2"},
                    {"original_id": "a1", "field": "a", "url": "http://a.com/small"},
                    {"original_id": "b1", "field": "b", "url": "http://b.com/small"}
                ],
                ":original": [
                    {"original_id": "a1", "field": "a", "url": "http://a.com/original"},
                    {"original_id": "a2", "field": "a", "url": "https://a.com/original2"},
                    {"original_id": "b1", "field": "b", "url": "http://b.com/original"}
                ]
            }
        })
        .to_string()
    }

    #[test]
    fn test_hmac_sha1_known_vector() {
        assert_eq!(
            sign("Jefe", "what do ya want for nothing?").unwrap(),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_sign_at_expires_next_day() {
        let settings = TransloaditSettings::new("key", "secret").template("gallery", "tpl-1");
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 23, 4, 5).unwrap();
        let config = settings.sign_at("gallery", "/upload", now).unwrap();

        assert_eq!(
            config.params,
            r#"{"auth":{"key":"key","expires":"2024/02/01 23:04:05"},"template_id":"tpl-1","redirect_url":"/upload"}"#
        );
        assert_eq!(config.signature, sign("secret", &config.params).unwrap());
        assert_eq!(config.signature.len(), 40);
    }

    #[test]
    fn test_sign_requires_template_and_credentials() {
        let settings = TransloaditSettings::new("key", "secret");
        assert!(matches!(settings.sign("missing", "/"), Err(FormError::Config(_))));

        let settings = TransloaditSettings::default().template(DEFAULT_TEMPLATE_KEY, "tpl");
        assert!(matches!(settings.sign(DEFAULT_TEMPLATE_KEY, "/"), Err(FormError::Config(_))));
    }

    #[test]
    fn test_from_settings() {
        let settings = TransloaditSettings::from_settings([
            ("transloadit.auth_key", "k"),
            ("transloadit.auth_secret", "s"),
            ("transloadit.template_id", "t1"),
            ("transloadit.gallery_template", "t2"),
            ("session.secret", "ignored"),
        ]);
        assert_eq!(settings.auth_key, "k");
        assert_eq!(settings.template_id(DEFAULT_TEMPLATE_KEY).unwrap(), "t1");
        assert_eq!(settings.template_id("gallery_template").unwrap(), "t2");
        assert_eq!(settings.templates.len(), 2);
        assert!(!format!("{settings:?}").contains("\"s\""));
    }

    #[test]
    fn test_parse_groups_orders_and_secures() {
        let files = parse_results(&assembly());

        assert_eq!(files.len(), 2);
        assert_eq!(files["a"].len(), 2);
        assert_eq!(files["b"].len(), 1);
        assert_eq!(files["a"][0]["small"], "https://a.com/small");
        assert_eq!(files["a"][1]["small"], "https://a.com/small2");
        assert_eq!(files["a"][1]["original"], "https://a.com/original2");
        assert_eq!(files["b"][0]["original"], "https://b.com/original");
    }

    #[test]
    fn test_parse_without_uploads_keeps_result_order() {
        let data = json!({
            "results": {
                "::medium": [
                    {"field": "a", "url": "http://a.com/1"},
                    {"field": "a", "url": "http://a.com/2"}
                ]
            }
        });
        let files = parse_results(&data.to_string());
        assert_eq!(files["a"][0]["medium"], "https://a.com/1");
        assert_eq!(files["a"][1]["medium"], "https://a.com/2");
    }

    #[test]
    fn test_parse_empty_or_broken_data() {
        assert!(parse_results("").is_empty());
        assert!(parse_results("{not json").is_empty());
        assert!(parse_results("{}").is_empty());
    }

    #[test]
    fn test_secure_url() {
        assert_eq!(secure_url("http://x.com/a"), "https://x.com/a");
        assert_eq!(secure_url("https://x.com/a"), "https://x.com/a");
        assert_eq!(secure_url("ftp://x.com/a"), "ftp://x.com/a");
    }

    #[test]
    fn test_mapping_single_and_sequence() {
        let mapping = TransloaditMapping::new()
            .single("logo", "b")
            .sequence("gallery.images", "a")
            .single("banner", "missing");
        let pstruct = Cstruct::map([("transloadit", assembly()), ("title", "Hi".to_string())]);

        let values = mapping.apply(pstruct);

        assert!(values.get(TRANSLOADIT_FIELD).is_null());
        assert_eq!(values.get("title").as_str(), Some("Hi"));
        assert_eq!(values.get_path("logo.small").as_str(), Some("https://b.com/small"));
        assert!(values.get("banner").is_null());
        match values.get_path("gallery.images") {
            Cstruct::Seq(images) => {
                assert_eq!(images.len(), 2);
                assert_eq!(images[1].get("small").as_str(), Some("https://a.com/small2"));
            }
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_mapping_fills_only_empty_items() {
        let existing = Cstruct::map([("small", "https://kept.com/s")]);
        let pstruct = Cstruct::map([
            ("transloadit", Cstruct::from(assembly())),
            (
                "slides",
                Cstruct::Seq(vec![
                    Cstruct::map([("caption", Cstruct::from("one")), ("image", existing.clone())]),
                    Cstruct::map([("caption", "two")]),
                    Cstruct::map([("caption", "three")]),
                    Cstruct::map([("caption", "four")]),
                ]),
            ),
        ]);

        let values = TransloaditMapping::new()
            .sequence("slides.*.image", "a")
            .apply(pstruct);

        let Cstruct::Seq(slides) = values.get("slides") else {
            panic!("slides should stay a sequence");
        };
        assert_eq!(slides[0].get("image"), &existing);
        assert_eq!(slides[1].get_path("image.small").as_str(), Some("https://a.com/small"));
        assert_eq!(slides[2].get_path("image.small").as_str(), Some("https://a.com/small2"));
        assert!(slides[3].get("image").is_null());
        assert_eq!(slides[3].get("caption").as_str(), Some("four"));
    }

    #[test]
    fn test_mapping_without_data_leaves_values() {
        let mapping = TransloaditMapping::new().single("logo", "logo");
        let pstruct = Cstruct::map([("logo.small", "x"), ("transloadit", "")]);
        let values = mapping.apply(pstruct);
        assert!(values.get(TRANSLOADIT_FIELD).is_null());
        assert_eq!(values.get("logo.small").as_str(), Some("x"));
        assert!(mapping.apply(Cstruct::Null).is_null());
    }

    #[test]
    fn test_image_field_validates_urls() {
        let config = SignedConfig {
            params: "{}".to_string(),
            signature: "sig".to_string(),
        };
        let form = Field::form("f")
            .child(transloadit_field(config.clone()))
            .child(image_field("logo", TransloaditImageWidget::new(config.clone()), false))
            .child(upload_field("manual", TransloaditUploadWidget::new(config), true));

        let pstruct = Cstruct::from_params([
            ("logo.small", "cdn.example.com/s.png"),
            ("logo.medium", "https://cdn.example.com/m.png"),
            ("logo.large", "https://cdn.example.com/l.png"),
            ("logo.original", "not a url"),
        ]);
        let errors = form.validate(&pstruct).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("logo.original").is_some());

        let pstruct = Cstruct::from_params([
            ("logo.small", "cdn.example.com/s.png"),
            ("logo.medium", "https://cdn.example.com/m.png"),
            ("logo.large", "https://cdn.example.com/l.png"),
            ("logo.original", "https://cdn.example.com/o.png"),
        ]);
        let appstruct = form.validate(&pstruct).unwrap();
        assert_eq!(
            appstruct.get_path("logo.small").as_str(),
            Some("http://cdn.example.com/s.png")
        );
        assert!(appstruct.get_path("manual.url").is_null());
        assert!(appstruct.get(TRANSLOADIT_FIELD).is_null());
    }
}
