//! Widgets for files uploaded through Transloadit.

use ironhtml::html;

use super::{html_escape, Widget};
use crate::cstruct::Cstruct;
use crate::error::Result;
use crate::field::Field;
use crate::transloadit::{SignedConfig, IMAGE_VARIANTS, UPLOAD_URL};

fn config_inputs(config: &SignedConfig) -> String {
    format!(
        r#"<input type="hidden" name="params" value="{}"/><input type="hidden" name="signature" value="{}"/>"#,
        html_escape(&config.params),
        html_escape(&config.signature)
    )
}

/// Hidden field posting the signed assembly parameters.
///
/// The field's own input starts empty; the client fills it with the
/// assembly results before the form is submitted.
#[derive(Debug, Clone)]
pub struct TransloaditConfigWidget {
    config: SignedConfig,
    render_config: bool,
}

impl TransloaditConfigWidget {
    /// Creates a widget that renders `config`.
    pub fn new(config: SignedConfig) -> Self {
        Self {
            config,
            render_config: true,
        }
    }

    /// Leaves the parameters to another widget on the page.
    #[must_use]
    pub fn without_config(mut self) -> Self {
        self.render_config = false;
        self
    }
}

impl Widget for TransloaditConfigWidget {
    fn template(&self) -> &str {
        "transloadit_config"
    }

    fn hidden(&self) -> bool {
        true
    }

    fn serialize(&self, field: &Field, _cstruct: &Cstruct) -> Result<String> {
        let config = if self.render_config {
            config_inputs(&self.config)
        } else {
            String::new()
        };
        Ok(format!(
            r#"{config}<input type="hidden" name="{}" value="" id="{}"/>"#,
            html_escape(&field.name),
            html_escape(&field.oid())
        ))
    }
}

#[derive(Debug, Clone)]
struct UploadControl {
    config: SignedConfig,
    render_config: bool,
    allow_remove: bool,
    category: Option<String>,
}

impl UploadControl {
    fn new(config: SignedConfig) -> Self {
        Self {
            config,
            render_config: false,
            allow_remove: false,
            category: None,
        }
    }

    // One hidden input per stored value, named `field.key`.
    fn render(&self, field: &Field, cstruct: &Cstruct, keys: &[&str], preview: &str) -> String {
        let values: String = keys
            .iter()
            .map(|key| {
                format!(
                    r#"<input type="hidden" name="{}" value="{}"/>"#,
                    html_escape(&format!("{}.{key}", field.name)),
                    html_escape(cstruct.get(key).as_str().unwrap_or_default())
                )
            })
            .collect();
        let file = format!(
            r#"<input type="file" id="{}" name="{}"/>"#,
            html_escape(&field.oid()),
            html_escape(&field.name)
        );
        let has_value = keys.iter().any(|key| !cstruct.get(key).is_empty());
        let config = if self.render_config {
            config_inputs(&self.config)
        } else {
            String::new()
        };

        let mut control = html! { div.class("transloadit-upload") }.id(format!("{}-upload", field.oid()));
        if let Some(category) = &self.category {
            control = control.attr("data-category", category);
        }
        control
            .raw(preview)
            .raw(&config)
            .raw(&file)
            .raw(&values)
            .when(self.allow_remove && has_value, |d| {
                d.raw(format!(
                    r#"<button type="button" class="btn btn-link remove-upload" data-target="{}">Remove</button>"#,
                    html_escape(&field.oid())
                ))
            })
            .render()
    }
}

/// File input for an image encoded into [`IMAGE_VARIANTS`].
///
/// Shows a thumbnail of the stored image and keeps each variant's URL in a
/// hidden input.
#[derive(Debug, Clone)]
pub struct TransloaditImageWidget {
    control: UploadControl,
    thumbnail_class: String,
}

impl TransloaditImageWidget {
    /// Creates an image widget signed with `config`.
    pub fn new(config: SignedConfig) -> Self {
        Self {
            control: UploadControl::new(config),
            thumbnail_class: "upload-image".to_string(),
        }
    }

    /// Also renders the signed parameters.
    #[must_use]
    pub fn render_config(mut self) -> Self {
        self.control.render_config = true;
        self
    }

    /// Offers a button clearing the stored image.
    #[must_use]
    pub fn allow_remove(mut self) -> Self {
        self.control.allow_remove = true;
        self
    }

    /// Tags the control with an upload category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.control.category = Some(category.into());
        self
    }

    /// Sets the CSS class of the thumbnail.
    #[must_use]
    pub fn thumbnail_class(mut self, class: impl Into<String>) -> Self {
        self.thumbnail_class = class.into();
        self
    }
}

impl Widget for TransloaditImageWidget {
    fn template(&self) -> &str {
        "transloadit_image"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let thumbnail = IMAGE_VARIANTS
            .iter()
            .find_map(|variant| cstruct.get(variant).as_str().filter(|url| !url.is_empty()));
        let preview = thumbnail.map_or_else(String::new, |url| {
            format!(
                r#"<img class="{}" src="{}" alt="{}"/>"#,
                html_escape(&self.thumbnail_class),
                html_escape(url),
                html_escape(&field.title)
            )
        });
        Ok(self.control.render(field, cstruct, &IMAGE_VARIANTS, &preview))
    }
}

/// File input for a generic upload stored as one URL.
#[derive(Debug, Clone)]
pub struct TransloaditUploadWidget {
    control: UploadControl,
}

impl TransloaditUploadWidget {
    /// Creates an upload widget signed with `config`.
    pub fn new(config: SignedConfig) -> Self {
        Self {
            control: UploadControl::new(config),
        }
    }

    /// Also renders the signed parameters.
    #[must_use]
    pub fn render_config(mut self) -> Self {
        self.control.render_config = true;
        self
    }

    /// Offers a button clearing the stored file.
    #[must_use]
    pub fn allow_remove(mut self) -> Self {
        self.control.allow_remove = true;
        self
    }

    /// Tags the control with an upload category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.control.category = Some(category.into());
        self
    }
}

impl Widget for TransloaditUploadWidget {
    fn template(&self) -> &str {
        "transloadit_upload"
    }

    fn serialize(&self, field: &Field, cstruct: &Cstruct) -> Result<String> {
        let preview = cstruct
            .get(UPLOAD_URL)
            .as_str()
            .filter(|url| !url.is_empty())
            .map_or_else(String::new, |url| {
                let url = html_escape(url);
                format!(r#"<a class="upload-link" href="{url}" target="_blank">{url}</a>"#)
            });
        Ok(self.control.render(field, cstruct, &[UPLOAD_URL], &preview))
    }
}
