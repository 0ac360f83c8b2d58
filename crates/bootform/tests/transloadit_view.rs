use std::sync::Mutex;

use bootform::schema::{csrf_field, CSRF_FIELD};
use bootform::transloadit::{
    image_field, transloadit_field, TransloaditMapping, TransloaditSettings, TRANSLOADIT_FIELD,
};
use bootform::widgets::{TextInputWidget, TransloaditImageWidget};
use bootform::{
    Cstruct, Field, FormHandler, FormRequest, FormView, FormViewOptions, HookOutcome, Result,
    TemplateVars, ViewOutcome,
};
use bootform_session::SessionHandle;
use serde_json::json;

struct EditProfile {
    settings: TransloaditSettings,
    saved: Mutex<Option<Cstruct>>,
}

impl EditProfile {
    fn new() -> Self {
        Self {
            settings: TransloaditSettings::from_settings([
                ("transloadit.auth_key", "public-key"),
                ("transloadit.auth_secret", "secret"),
                ("transloadit.avatar_template", "tpl-avatar"),
            ]),
            saved: Mutex::new(None),
        }
    }
}

impl FormHandler for EditProfile {
    fn schema(&self, request: &FormRequest) -> Result<Field> {
        let config = self.settings.sign("avatar_template", &request.path)?;
        Ok(Field::form("profile")
            .child(csrf_field(&request.method, &request.csrf_token()?))
            .child(transloadit_field(config.clone()))
            .child(Field::new("display_name", TextInputWidget::new()).required())
            .child(image_field("avatar", TransloaditImageWidget::new(config), true))
            .unpacker(TransloaditMapping::new().single("avatar", "avatar")))
    }

    fn success(&self, _request: &FormRequest, appstruct: &Cstruct) -> Result<HookOutcome> {
        *self.saved.lock().unwrap() = Some(appstruct.clone());
        Ok(HookOutcome::Redirect("/profile".to_string()))
    }
}

fn assembly() -> String {
    json!({
        "uploads": [{"id": "up1", "field": "avatar"}],
        "results": {
            "small": [{"original_id": "up1", "field": "avatar", "url": "http://cdn.example.com/s.jpg"}],
            "medium": [{"original_id": "up1", "field": "avatar", "url": "http://cdn.example.com/m.jpg"}],
            "large": [{"original_id": "up1", "field": "avatar", "url": "http://cdn.example.com/l.jpg"}],
            ":original": [{"original_id": "up1", "field": "avatar", "url": "http://cdn.example.com/o.jpg"}]
        }
    })
    .to_string()
}

fn render_vars(outcome: ViewOutcome) -> TemplateVars {
    match outcome {
        ViewOutcome::Render(vars) => vars,
        ViewOutcome::Redirect(url) => panic!("unexpected redirect to {url}"),
    }
}

#[test]
fn get_renders_signed_params_and_skips_upload_section() {
    let session = SessionHandle::default();
    let request = FormRequest::get().path("/profile/edit").session(session);
    let view = FormView::new(EditProfile::new(), FormViewOptions::new());

    let vars = render_vars(view.handle(&request).unwrap());
    let form = vars.form.unwrap();

    assert!(form.contains(r#"name="params" value="{&quot;auth&quot;:{&quot;key&quot;:&quot;public-key&quot;"#));
    assert!(form.contains("&quot;template_id&quot;:&quot;tpl-avatar&quot;"));
    assert!(form.contains("&quot;redirect_url&quot;:&quot;/profile/edit&quot;"));
    assert!(form.contains(r#"name="signature" value=""#));
    assert!(form.contains(r#"<input type="file" id="id_avatar" name="avatar"/>"#));

    let sections: Vec<&str> = vars.form_sections.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(sections, vec!["display_name", "avatar"]);
}

#[test]
fn posted_results_reach_the_appstruct() {
    let session = SessionHandle::default();
    let token = session.csrf_token().unwrap();
    let request = FormRequest::post()
        .session(session)
        .param(CSRF_FIELD, token)
        .param("display_name", "Ada")
        .param(TRANSLOADIT_FIELD, assembly());
    let handler = EditProfile::new();
    let view = FormView::new(handler, FormViewOptions::new());

    match view.handle(&request).unwrap() {
        ViewOutcome::Redirect(url) => assert_eq!(url, "/profile"),
        ViewOutcome::Render(vars) => panic!("expected redirect, got {:?}", vars.error),
    }

    let saved = view.handler().saved.lock().unwrap().clone().unwrap();
    assert_eq!(saved.get_path("avatar.small").as_str(), Some("https://cdn.example.com/s.jpg"));
    assert_eq!(saved.get_path("avatar.original").as_str(), Some("https://cdn.example.com/o.jpg"));
    assert!(saved.get(TRANSLOADIT_FIELD).is_null());
}

#[test]
fn failed_post_rerenders_uploaded_image() {
    let session = SessionHandle::default();
    let token = session.csrf_token().unwrap();
    let request = FormRequest::post()
        .session(session)
        .param(CSRF_FIELD, token)
        .param(TRANSLOADIT_FIELD, assembly());
    let view = FormView::new(EditProfile::new(), FormViewOptions::new());

    let vars = render_vars(view.handle(&request).unwrap());
    assert_eq!(vars.status, 400);
    assert!(vars.error.unwrap().get("display_name").is_some());

    let form = vars.form.unwrap();
    assert!(form.contains(r#"<img class="upload-image" src="https://cdn.example.com/s.jpg""#));
    assert!(form.contains(r#"name="avatar.large" value="https://cdn.example.com/l.jpg""#));
}

#[test]
fn missing_template_is_a_config_error() {
    struct Misconfigured;

    impl FormHandler for Misconfigured {
        fn schema(&self, request: &FormRequest) -> Result<Field> {
            let config = TransloaditSettings::new("k", "s").sign("nope", &request.path)?;
            Ok(Field::form("f").child(transloadit_field(config)))
        }
    }

    let view = FormView::new(Misconfigured, FormViewOptions::new());
    let err = view.handle(&FormRequest::get()).unwrap_err();
    assert!(err.to_string().contains("no transloadit template for `nope`"));
}
