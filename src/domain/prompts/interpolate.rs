//! `{{variable}}` interpolation for caller-authored prompt templates.

use std::collections::HashMap;

/// Substitutes `{{name}}` placeholders from `vars`.
///
/// Placeholder names are trimmed, so `{{ objective }}` and
/// `{{objective}}` are equivalent. Unknown placeholders are left
/// verbatim so authoring mistakes stay visible instead of vanishing.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("}}") {
            Some(end) => {
                let name = rest[start + 2..start + 2 + end].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &rest[start + 2 + end + 2..];
            }
            // Unterminated placeholder: emit as-is.
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
