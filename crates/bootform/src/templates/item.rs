use ironhtml::html;
use ironhtml_elements::{Div, Label, Span, P};

use super::render_children;
use crate::error::Result;
use crate::renderer::{RenderContext, Template};
use crate::widgets::{html_escape, WidgetCategory};

/// Renders one child field with its label, error and help text.
///
/// Hidden and structural widgets get no chrome.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingItemTemplate;

impl Template for MappingItemTemplate {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let field = ctx.field;
        let control = field.render(ctx.cstruct)?;

        if field.widget.hidden() || field.widget.category() == WidgetCategory::Structural {
            return Ok(control);
        }

        let mut class = String::from("control-group");
        if field.error.is_some() {
            class.push_str(" error");
        }
        if field.required {
            class.push_str(" required");
        }

        let oid = field.oid();
        let item_id = format!("item-{oid}");
        let errormsg = field
            .error
            .as_ref()
            .map(|e| e.errormsg.clone())
            .unwrap_or_default();
        let description = field.description.clone().unwrap_or_default();

        let item = html! { div.class(#class) }
            .attr("id", &item_id)
            .when(!field.title.is_empty(), |d| {
                d.child::<Label, _>(|l| {
                    l.class("control-label")
                        .attr("for", &oid)
                        .text(&field.title)
                        .when(field.required, |l| {
                            l.child::<Span, _>(|s| s.class("req").text("*"))
                        })
                })
            })
            .child::<Div, _>(|d| {
                d.class("controls")
                    .raw(&control)
                    .when(field.error.is_some(), |d| {
                        d.child::<Span, _>(|s| s.class("help-inline").text(&errormsg))
                    })
                    .when(field.description.is_some(), |d| {
                        d.child::<P, _>(|p| p.class("help-block").text(&description))
                    })
            });

        Ok(item.render())
    }
}

/// Renders a nested mapping as a fieldset.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingTemplate;

impl Template for MappingTemplate {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let field = ctx.field;
        let legend = if field.title.is_empty() {
            String::new()
        } else {
            format!("<legend>{}</legend>", html_escape(&field.title))
        };
        let children = render_children(field, ctx.cstruct)?;

        Ok(format!(
            r#"<fieldset class="deform-mapping-fieldset" id="{}">{legend}{children}</fieldset>"#,
            html_escape(&field.oid())
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::cstruct::Cstruct;
    use crate::field::Field;
    use crate::renderer::{Renderer, MAPPING_ITEM_TEMPLATE};
    use crate::widgets::{FormActionsWidget, HiddenWidget, MappingWidget, TextInputWidget};

    fn item(field: &Field, cstruct: &Cstruct) -> String {
        field
            .renderer
            .render(MAPPING_ITEM_TEMPLATE, field, cstruct)
            .unwrap()
    }

    #[test]
    fn test_item_has_label_and_control() {
        let field = Field::new("first_name", TextInputWidget::new())
            .required()
            .description("As on your passport");
        let html = item(&field, &Cstruct::from("Ada"));

        assert!(html.contains("control-group"));
        assert!(html.contains(r#"for="id_first_name""#));
        assert!(html.contains("First Name"));
        assert!(html.contains(r#"value="Ada""#));
        assert!(html.contains("help-block"));
        assert!(html.contains("As on your passport"));
        assert!(!html.contains("help-inline"));
    }

    #[test]
    fn test_item_error() {
        let field = Field::new("email", TextInputWidget::email()).error("Invalid email address");
        let html = item(&field, &Cstruct::Null);
        assert!(html.contains("control-group error"));
        assert!(html.contains("help-inline"));
        assert!(html.contains("Invalid email address"));
    }

    #[test]
    fn test_hidden_and_structural_render_bare() {
        let hidden = Field::new("_csrf", HiddenWidget);
        let html = item(&hidden, &Cstruct::from("tok"));
        assert!(html.starts_with("<input"));

        let actions = Field::new("actions", FormActionsWidget::new(["save"]));
        let html = item(&actions, &Cstruct::Null);
        assert!(!html.contains("control-group"));
        assert!(!html.contains("<label"));
    }

    #[test]
    fn test_mapping_renders_fieldset_with_children() {
        let address = Field::new("address", MappingWidget)
            .child(Field::new("city", TextInputWidget::new()))
            .child(Field::new("zip", TextInputWidget::new()));
        let cstruct = Cstruct::from_params([("city", "London")]);
        let html = address.render(&cstruct).unwrap();

        assert!(html.starts_with("<fieldset"));
        assert!(html.contains("<legend>Address</legend>"));
        assert!(html.contains(r#"value="London""#));
        assert!(html.find(r#"name="city""#) < html.find(r#"name="zip""#));
    }
}
