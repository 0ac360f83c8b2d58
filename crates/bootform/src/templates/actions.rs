use ironhtml::html;

use crate::field::Button;
use crate::widgets::html_escape;

/// Renders `buttons` as `<input>` elements, the first one styled primary.
///
/// The `form-actions` wrapper is left out for inline forms.
pub fn render_button_bar(buttons: &[Button], formid: &str, inline: bool) -> String {
    let inputs: String = buttons
        .iter()
        .enumerate()
        .map(|(i, button)| render_button(button, formid, i == 0))
        .collect();

    if inline {
        inputs
    } else {
        html! { div.class("form-actions") }.raw(&inputs).render()
    }
}

fn render_button(button: &Button, formid: &str, primary: bool) -> String {
    let mut class = if primary { "btn btn-primary" } else { "btn" }.to_string();
    if let Some(extra) = &button.css_class {
        class.push(' ');
        class.push_str(extra);
    }
    let disabled = if button.disabled {
        r#" disabled="disabled""#
    } else {
        ""
    };

    format!(
        r#"<input type="{}" id="{}" name="{}" value="{}" class="{}"{disabled}/>"#,
        html_escape(&button.button_type),
        html_escape(&format!("{formid}{}", button.name)),
        html_escape(&button.name),
        html_escape(&button.value),
        html_escape(&class),
    )
}
