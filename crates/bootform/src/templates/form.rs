use ironhtml::html;
use ironhtml_elements::{Div, Fieldset, Input, Legend, Script, Strong, P};

use super::{render_ajax_script, render_button_bar, render_children};
use crate::error::Result;
use crate::field::FormStyle;
use crate::i18n::{ERRORS_HIGHLIGHTED, PROBLEM_HEADING};
use crate::renderer::{RenderContext, Template};

/// Renders the root `<form>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormTemplate;

impl Template for FormTemplate {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let field = ctx.field;
        let inline = field.bootstrap_form_style == Some(FormStyle::Inline);

        let class = [
            field.bootstrap_form_style.map(|s| s.as_str()).unwrap_or(""),
            field.css_class.as_deref().unwrap_or(""),
        ]
        .iter()
        .filter(|c| !c.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

        let (heading, errormsg) = match &field.error {
            Some(error) => {
                let msg = if error.errormsg.is_empty() {
                    ctx.translate(ERRORS_HIGHLIGHTED)
                } else {
                    error.errormsg.clone()
                };
                (ctx.translate(PROBLEM_HEADING), msg)
            }
            None => (String::new(), String::new()),
        };

        let children = render_children(field, ctx.cstruct)?;

        let buttons = if field.buttons.is_empty() {
            String::new()
        } else {
            render_button_bar(&field.buttons, &field.formid, inline)
        };

        let script = if field.use_ajax {
            render_ajax_script(&field.formid, &field.ajax_options)?
        } else {
            String::new()
        };

        let action = &field.action;
        let method = &field.method;

        let form = html! {
            form.action(#action).method(#method)
        }
        .id(&field.formid)
        .attr("enctype", &field.enctype)
        .attr("accept-charset", "utf-8")
        .when(!class.is_empty(), |f| f.class(&class))
        .child::<Fieldset, _>(|fs| {
            fs.class("deformFormFieldset")
                .when(!field.title.is_empty(), |fs| {
                    fs.child::<Legend, _>(|l| l.text(&field.title))
                })
                .child::<Input, _>(|i| i.attr("type", "hidden").attr("name", "_charset_"))
                .child::<Input, _>(|i| {
                    i.attr("type", "hidden")
                        .attr("name", "__formid__")
                        .attr("value", &field.formid)
                })
                .when(field.error.is_some(), |fs| {
                    fs.child::<Div, _>(|d| {
                        d.class("alert alert-danger")
                            .attr("role", "alert")
                            .child::<Strong, _>(|s| s.text(&heading))
                            .child::<P, _>(|p| p.class("errorMsg").text(&errormsg))
                    })
                })
                .child::<Div, _>(|d| d.raw(&children))
                .when(!buttons.is_empty(), |fs| fs.child::<Div, _>(|d| d.raw(&buttons)))
        })
        .when(field.use_ajax, |f| {
            f.child::<Script, _>(|s| s.attr("type", "text/javascript").raw(&script))
        });

        Ok(form.render())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::cstruct::Cstruct;
    use crate::field::{Field, FormStyle};
    use crate::i18n::CatalogTranslator;
    use crate::renderer::{Renderer, TemplateRegistry, FORM_TEMPLATE};

    #[test]
    fn test_basic_form_attributes() {
        let form = Field::form("signup").action("/signup");
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.starts_with("<form"));
        assert!(html.contains(r#"id="signup""#));
        assert!(html.contains(r#"action="/signup""#));
        assert!(html.contains(r#"method="POST""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"accept-charset="utf-8""#));
        assert!(html.contains(r#"<fieldset class="deformFormFieldset">"#));
        assert!(html.contains(r#"<input type="hidden" name="_charset_" />"#));
        assert!(html.contains(r#"<input type="hidden" name="__formid__" value="signup" />"#));
        assert!(!html.contains("<legend>"));
    }

    #[test]
    fn test_legend_is_first_in_fieldset_and_escaped() {
        let form = Field::form("f").title("Terms & <Conditions>");
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.contains(
            r#"<fieldset class="deformFormFieldset"><legend>Terms &amp; &lt;Conditions&gt;</legend>"#
        ));
    }

    #[test]
    fn test_formid_attribute_escaped_once() {
        let form = Field::form(r#"a"b"#);
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.contains(r#"name="__formid__" value="a&quot;b""#));
        assert!(!html.contains("&amp;quot;"));
    }

    #[test]
    fn test_form_closes_after_script() {
        let html = Field::form("f")
            .ajax(json!({}))
            .render(&Cstruct::Null)
            .unwrap();
        assert!(html.ends_with("</script></form>"));
        assert!(html.find("</fieldset>") < html.find("<script"));
    }

    #[test]
    fn test_class_joins_style_and_css_class() {
        let form = Field::form("f").style(FormStyle::Horizontal).css_class("wide");
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.contains(r#"class="form-horizontal wide""#));
    }

    #[test]
    fn test_inline_form_has_no_actions_wrapper() {
        let form = Field::form("f").style(FormStyle::Inline).button("search");
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.contains("btn-primary"));
        assert!(!html.contains("form-actions"));
    }

    #[test]
    fn test_empty_errormsg_shows_highlight_notice() {
        let form = Field::form("f").error("");
        let html = form.render(&Cstruct::Null).unwrap();
        assert!(html.contains("There was a problem with your submission"));
        assert!(html.contains("Errors have been highlighted below"));
    }

    #[test]
    fn test_heading_is_translated() {
        let registry = TemplateRegistry::bootstrap().with_translator(
            CatalogTranslator::new("bootform")
                .message(crate::i18n::PROBLEM_HEADING, "Il y a eu un problème"),
        );
        let form = Field::form("f").error("Bad");
        let html = registry.render(FORM_TEMPLATE, &form, &Cstruct::Null).unwrap();
        assert!(html.contains("Il y a eu un problème"));
        assert!(html.contains("Bad"));
    }

    #[test]
    fn test_ajax_script_only_when_enabled() {
        let plain = Field::form("f").render(&Cstruct::Null).unwrap();
        assert!(!plain.contains("<script"));

        let ajax = Field::form("f")
            .ajax(json!({"dataType": "json"}))
            .render(&Cstruct::Null)
            .unwrap();
        assert!(ajax.contains("<script"));
        assert!(ajax.contains(r#""dataType":"json""#));
    }
}
