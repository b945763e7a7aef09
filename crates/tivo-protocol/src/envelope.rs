//! Request and response envelopes
//!
//! Requests arrive as `{"type":"request","cmd":"<name>","params":{...}}`.
//! Responses go out as `{"type":"response","cmd":"<name>","result":{...}}`
//! or, on failure, with an `error` string in place of `result`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CommandError;

/// Named parameters of a request
pub type Params = Map<String, Value>;

/// An inbound command request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Envelope type, normally `"request"`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Command name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    /// Command parameters, as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestEnvelope {
    /// Read an envelope out of a decoded transport message
    ///
    /// Never fails: anything that is not an object, or whose `cmd` is not a
    /// string, simply yields an envelope without a command.
    pub fn from_value(message: &Value) -> Self {
        let Some(obj) = message.as_object() else {
            return Self::default();
        };
        Self {
            kind: obj.get("type").and_then(Value::as_str).map(str::to_string),
            cmd: obj.get("cmd").and_then(Value::as_str).map(str::to_string),
            params: obj.get("params").cloned(),
        }
    }

    /// Parameters as a map
    ///
    /// A missing or `null` `params` field is an empty map; any other
    /// non-object value is rejected.
    pub fn params(&self) -> Result<Params, CommandError> {
        match &self.params {
            None | Some(Value::Null) => Ok(Params::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(CommandError::InvalidParameters),
        }
    }
}

/// An outbound command response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Always `"response"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Echo of the request's command, absent when the request had none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    /// Command output on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    /// Human-readable failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful response carrying `result`
    pub fn success(cmd: impl Into<String>, result: Map<String, Value>) -> Self {
        Self {
            kind: "response".to_string(),
            cmd: Some(cmd.into()),
            result: Some(result),
            error: None,
        }
    }

    /// Failed response for `cmd` (or for a request without a command)
    pub fn failure(cmd: Option<String>, error: &CommandError) -> Self {
        Self {
            kind: "response".to_string(),
            cmd,
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// Returns true if this response reports an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Encode as a JSON value for publishing
    ///
    /// Strings and JSON maps always serialize, so this cannot yield `Null`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_from_value() {
        let msg = json!({"type": "request", "cmd": "pause", "params": {}});
        let req = RequestEnvelope::from_value(&msg);

        assert_eq!(req.kind.as_deref(), Some("request"));
        assert_eq!(req.cmd.as_deref(), Some("pause"));
        assert_eq!(req.params().unwrap(), Params::new());
    }

    #[test]
    fn test_request_without_command() {
        assert_eq!(RequestEnvelope::from_value(&json!({"params": {}})).cmd, None);
        assert_eq!(RequestEnvelope::from_value(&json!({"cmd": 5})).cmd, None);
        assert_eq!(RequestEnvelope::from_value(&json!("pause")).cmd, None);
    }

    #[test]
    fn test_params_shape() {
        let missing = RequestEnvelope::from_value(&json!({"cmd": "pause"}));
        assert!(missing.params().unwrap().is_empty());

        let list = RequestEnvelope::from_value(&json!({"cmd": "pause", "params": [1]}));
        assert_eq!(list.params(), Err(CommandError::InvalidParameters));
    }

    #[test]
    fn test_success_response_json() {
        let mut result = Map::new();
        result.insert("status".into(), json!("success"));
        let resp = ResponseEnvelope::success("pause", result);

        assert_eq!(
            resp.to_value(),
            json!({"type": "response", "cmd": "pause", "result": {"status": "success"}})
        );
        assert_eq!(serde_json::to_value(&resp).unwrap(), resp.to_value());
    }

    #[test]
    fn test_failure_response_json() {
        let resp = ResponseEnvelope::failure(
            Some("rewind".into()),
            &CommandError::UnknownCommand("rewind".into()),
        );

        assert_eq!(
            resp.to_value(),
            json!({
                "type": "response",
                "cmd": "rewind",
                "error": "Command (rewind) is not a valid directive."
            })
        );
    }

    #[test]
    fn test_missing_command_response_omits_cmd() {
        let resp = ResponseEnvelope::failure(None, &CommandError::MissingCommand);
        let value = resp.to_value();

        assert!(resp.is_error());
        assert!(value.get("cmd").is_none());
        assert!(value.get("result").is_none());
        assert_eq!(value["error"], "Message does not contain a command directive.");
    }
}
