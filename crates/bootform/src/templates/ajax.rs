use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;

/// Merges caller options over the JSON-representable defaults.
///
/// Shallow merge: top-level override keys replace defaults, defaults missing
/// from the override are kept. Non-object overrides are ignored.
pub fn merge_ajax_options(overrides: &Value) -> Map<String, Value> {
    let mut merged = Map::new();
    merged.insert("replaceTarget".to_string(), Value::Bool(true));

    match overrides {
        Value::Object(extra) => {
            for (key, value) in extra {
                merged.insert(key.clone(), value.clone());
            }
        }
        Value::Null => {}
        other => warn!(options = %other, "ignoring non-object ajax options"),
    }
    merged
}

/// Renders the script registering AJAX submission for `formid`.
pub fn render_ajax_script(formid: &str, ajax_options: &Value) -> Result<String> {
    let formid_js = script_json(&Value::String(formid.to_string()))?;
    let options_js = script_json(&Value::Object(merge_ajax_options(ajax_options)))?;

    Ok(format!(
        r#"
deform.addCallback(
  {formid_js},
  function (oid) {{
    var target = '#' + oid;
    var options = {{
      target: target,
      replaceTarget: true,
      success: function () {{
        deform.processCallbacks();
        deform.focusFirstInput(target);
      }}
    }};
    var extra_options = {options_js};
    $.extend(options, extra_options);
    $(target).ajaxForm(options);
  }}
);
"#
    ))
}

// JSON inside <script> must not close the element early.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
