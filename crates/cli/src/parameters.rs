//! Decode parameter bags from the command line.

use query_engine_criteria::criteria::{ParameterBag, ParameterValue, Scalar};

/// Decode a JSON object into a parameter bag.
pub fn from_json(input: &str) -> anyhow::Result<ParameterBag> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    Ok(ParameterBag::try_from(value)?)
}

/// Decode a URL query string, with or without its leading `?`.
///
/// Every value is a string. `key[]=a&key[]=b` builds the sequence `["a", "b"]`
/// for `key`; a plain key given more than once keeps its last value.
pub fn from_query_string(query: &str) -> ParameterBag {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut bag = ParameterBag::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Scalar::String(value.into_owned());
        match key.strip_suffix("[]") {
            Some(field) => {
                let values = match bag.get(field) {
                    Some(ParameterValue::Sequence(existing)) => {
                        let mut values = existing.clone();
                        values.push(value);
                        values
                    }
                    _ => vec![value],
                };
                bag.insert(field, values);
            }
            None => bag.insert(key.into_owned(), value),
        }
    }
    bag
}
