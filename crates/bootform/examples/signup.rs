//! Sign-up form demo.
//!
//! Walks one session through a GET, an invalid POST, a valid POST and the
//! page that follows the redirect, printing the markup of each step.
//!
//! ```sh
//! cargo run -p bootform --example signup -- --verbose
//! ```

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bootform::preparers::{coerce_to_lowercase, strip_whitespace};
use bootform::schema::{csrf_field, CSRF_FIELD};
use bootform::templates::FlashPanel;
use bootform::validation::{EmailValidator, MinLengthValidator};
use bootform::widgets::{CheckboxWidget, FormActionsWidget, TextInputWidget};
use bootform::{
    Cstruct, Field, FormHandler, FormRequest, FormStyle, FormView, FormViewOptions, HookOutcome,
    Result, ViewOutcome,
};
use bootform_session::{FlashQueue, SessionStore};

/// Renders a sign-up form through a full request cycle.
#[derive(Parser)]
#[command(name = "signup")]
#[command(about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Submit through AJAX
    #[arg(long)]
    ajax: bool,
}

struct SignUp;

impl FormHandler for SignUp {
    fn schema(&self, request: &FormRequest) -> Result<Field> {
        Ok(Field::form("signup")
            .title("Sign Up")
            .child(csrf_field(&request.method, &request.csrf_token()?))
            .child(
                Field::new("email", TextInputWidget::email().placeholder("you@example.com"))
                    .required()
                    .preparer(strip_whitespace)
                    .preparer(coerce_to_lowercase)
                    .validator(EmailValidator::new()),
            )
            .child(
                Field::new("password", TextInputWidget::password())
                    .required()
                    .validator(MinLengthValidator::new(8))
                    .description("At least 8 characters"),
            )
            .child(Field::new("newsletter", CheckboxWidget::new()).title("Send me news"))
            .child(Field::new("actions", FormActionsWidget::new(["submit"]))))
    }

    fn success(&self, request: &FormRequest, appstruct: &Cstruct) -> Result<HookOutcome> {
        let email = appstruct.get("email").as_str().unwrap_or_default();
        if let Some(session) = &request.session {
            session.flash("", &format!("Welcome aboard, {email}!"))?;
        }
        Ok(HookOutcome::Redirect("/welcome".to_string()))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut options = FormViewOptions::new()
        .buttons(["create"])
        .action("/signup")
        .style(FormStyle::Horizontal);
    if cli.ajax {
        options = options.ajax(serde_json::json!({"dataType": "html"}));
    }
    let view = FormView::new(SignUp, options);
    let store = SessionStore::new();
    let session = store.create()?;
    let panel = FlashPanel::new("");

    info!("GET /signup");
    let get = FormRequest::get().session(session.clone());
    if let ViewOutcome::Render(vars) = view.handle(&get)? {
        println!("<h1>{}</h1>", vars.form_name);
        println!("{}", panel.render(&session, || vars.render_form.render())?);
    }

    info!("POST /signup (invalid)");
    let token = session.csrf_token()?;
    let invalid = FormRequest::post()
        .session(session.clone())
        .param(CSRF_FIELD, token.clone())
        .param("email", "not-an-email")
        .param("password", "short");
    if let ViewOutcome::Render(vars) = view.handle(&invalid)? {
        info!(status = vars.status, "validation failed");
        println!("{}", vars.form.unwrap_or_default());
    }

    info!("POST /signup (valid)");
    let valid = FormRequest::post()
        .session(session.clone())
        .param(CSRF_FIELD, token)
        .param("email", "  Ada@Example.com ")
        .param("password", "correct horse")
        .param("newsletter", "true");
    if let ViewOutcome::Redirect(url) = view.handle(&valid)? {
        info!(%url, "redirecting");
    }

    info!("GET /signup (after redirect)");
    if let ViewOutcome::Render(vars) = view.handle(&get)? {
        println!("{}", panel.render(&session, || vars.render_form.render())?);
    }

    Ok(())
}
