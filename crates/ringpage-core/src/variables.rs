//! Variable resolution: turning a page's bindings plus a submission into the
//! flat `variable_values` map sent to the provider.

use std::collections::BTreeMap;

use crate::{
  demo_page::{VariableBindings, VariableSource},
  form::FormData,
};

/// Resolve `bindings` against `form`.
///
/// - List bindings are applied in order. Entries with a blank key are
///   skipped. `field` entries copy the submitted value (untrimmed) when it is
///   present and non-blank; `static` entries contribute their trimmed value
///   when non-blank.
/// - Legacy bindings copy `form[field_key]` for each entry when non-blank.
///
/// When two entries target the same key the later one wins.
pub fn resolve_variables(bindings: &VariableBindings, form: &FormData) -> BTreeMap<String, String> {
  let mut out = BTreeMap::new();

  match bindings {
    VariableBindings::List(vars) => {
      for v in vars {
        let name = v.key.trim();
        if name.is_empty() {
          continue;
        }
        let value = match v.source {
          VariableSource::Field => form.non_blank(v.value.trim()).map(str::to_owned),
          VariableSource::Static => Some(v.value.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        };
        if let Some(value) = value {
          out.insert(name.to_owned(), value);
        }
      }
    }
    VariableBindings::Legacy(map) => {
      for (name, field_key) in map {
        if let Some(value) = form.non_blank(field_key) {
          out.insert(name.clone(), value.to_owned());
        }
      }
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::demo_page::Variable;

  fn var(key: &str, source: VariableSource, value: &str) -> Variable {
    Variable { key: key.into(), source, value: value.into() }
  }

  #[test]
  fn static_and_field_sources() {
    let bindings = VariableBindings::List(vec![
      var("greeting", VariableSource::Static, "hi"),
      var("name", VariableSource::Field, "fullName"),
    ]);
    let form: FormData = [("fullName", "Ann")].into_iter().collect();

    let out = resolve_variables(&bindings, &form);
    let expected: BTreeMap<String, String> =
      [("greeting".to_string(), "hi".to_string()), ("name".to_string(), "Ann".to_string())].into();
    assert_eq!(out, expected);
  }

  #[test]
  fn blank_field_value_is_omitted() {
    let bindings = VariableBindings::List(vec![
      var("greeting", VariableSource::Static, "hi"),
      var("name", VariableSource::Field, "fullName"),
    ]);
    let form: FormData = [("fullName", "")].into_iter().collect();

    let out = resolve_variables(&bindings, &form);
    assert_eq!(out.len(), 1);
    assert!(!out.contains_key("name"));
  }

  #[test]
  fn static_values_are_trimmed_and_blank_ones_dropped() {
    let bindings = VariableBindings::List(vec![
      var("a", VariableSource::Static, "  padded  "),
      var("b", VariableSource::Static, "   "),
      var("  ", VariableSource::Static, "ignored"),
    ]);
    let out = resolve_variables(&bindings, &FormData::new());
    assert_eq!(out.len(), 1);
    assert_eq!(out["a"], "padded");
  }

  #[test]
  fn field_values_pass_through_untrimmed() {
    let bindings = VariableBindings::List(vec![var("note", VariableSource::Field, " msg ")]);
    let form: FormData = [("msg", "  hello ")].into_iter().collect();
    assert_eq!(resolve_variables(&bindings, &form)["note"], "  hello ");
  }

  #[test]
  fn later_duplicates_win() {
    let bindings = VariableBindings::List(vec![
      var("who", VariableSource::Static, "first"),
      var("who", VariableSource::Field, "name"),
    ]);
    let form: FormData = [("name", "second")].into_iter().collect();
    assert_eq!(resolve_variables(&bindings, &form)["who"], "second");

    // A skipped later entry does not erase an earlier one.
    let empty = FormData::new();
    assert_eq!(resolve_variables(&bindings, &empty)["who"], "first");
  }

  #[test]
  fn legacy_map_is_read() {
    let bindings = VariableBindings::Legacy(
      [
        ("customer_name".to_string(), "name".to_string()),
        ("company".to_string(), "org".to_string()),
      ]
      .into(),
    );
    let form: FormData = [("name", "Ann"), ("org", " ")].into_iter().collect();

    let out = resolve_variables(&bindings, &form);
    assert_eq!(out.len(), 1);
    assert_eq!(out["customer_name"], "Ann");
  }
}
