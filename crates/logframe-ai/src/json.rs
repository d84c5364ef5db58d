use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Locate the outermost JSON object in a model reply.
///
/// Replies sometimes arrive wrapped in Markdown fences or surrounded by
/// prose even when JSON mode was requested.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode a model reply into `T`, tolerating fences and surrounding prose.
///
/// The reply must be a JSON object. Arrays and scalars are rejected rather
/// than read positionally into the struct fields.
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(_) => {
            let object = extract_json_object(text)
                .ok_or_else(|| anyhow!("No JSON object found in model reply"))?;
            serde_json::from_str(object).context("Model reply is not valid JSON")?
        }
    };

    if !value.is_object() {
        bail!("Model reply is JSON but not an object");
    }
    serde_json::from_value(value).context("Model reply does not match the expected shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_from_markdown_fence() {
        let reply = "Here is the review:\n```json\n{\"shortcomings\": [\"a\"]}\n```\nThanks";
        assert_eq!(extract_json_object(reply), Some("{\"shortcomings\": [\"a\"]}"));

        let value: Value = parse_reply(reply).unwrap();
        assert_eq!(value["shortcomings"][0], "a");
    }

    #[test]
    fn test_nested_objects_keep_outer_braces() {
        let reply = "{\"a\": {\"b\": 1}}";
        assert_eq!(extract_json_object(reply), Some(reply));
    }

    #[test]
    fn test_no_object_is_an_error() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(parse_reply::<Value>("plain prose").is_err());
    }

    #[test]
    fn test_top_level_arrays_are_rejected() {
        assert!(parse_reply::<Value>("[]").is_err());
        assert!(parse_reply::<Value>("[\"x\", \"y\"]").is_err());
        assert!(parse_reply::<Value>("42").is_err());
        assert!(parse_reply::<Value>(" {\"ok\": true} ").is_ok());
    }
}
