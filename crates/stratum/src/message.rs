use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Clone)]
#[serde(untagged)]
pub enum Id {
    #[display("null")]
    Null,
    Number(u64),
    String(String),
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum Message {
    Request {
        id: Id,
        method: String,
        params: Value,
    },
    Response {
        id: Id,
        result: Option<Value>,
        error: Option<JsonRpcError>,
        #[serde(skip_serializing_if = "Option::is_none", rename = "reject-reason")]
        reject_reason: Option<String>,
    },
    Notification {
        method: String,
        params: Value,
    },
}

impl Message {
    pub fn request(id: u64, method: &str, params: Value) -> Self {
        Self::Request {
            id: Id::Number(id),
            method: method.into(),
            params,
        }
    }
}

/// Pools send notifications with `"id": null` as well as without an id at all,
/// so a `method` with a null or missing id is a notification. A `method` with any
/// other id is a request, which a miner ignores.
impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if !value.is_object() {
            return Err(de::Error::custom("message must be a JSON object"));
        }

        let has_method = value.get("method").is_some();
        let id = value.get("id");

        let is_response = value.get("result").is_some()
            || value.get("error").is_some()
            || value.get("reject-reason").is_some();

        if is_response && !has_method {
            #[derive(Deserialize)]
            struct Response {
                id: Id,
                result: Option<Value>,
                error: Option<JsonRpcError>,
                #[serde(rename = "reject-reason")]
                reject_reason: Option<String>,
            }

            let response: Response = serde_json::from_value(value).map_err(de::Error::custom)?;

            Ok(Message::Response {
                id: response.id,
                result: response.result,
                error: response.error,
                reject_reason: response.reject_reason,
            })
        } else if has_method && matches!(id, None | Some(Value::Null)) {
            let method = value
                .get("method")
                .and_then(Value::as_str)
                .ok_or_else(|| de::Error::missing_field("method"))?
                .to_string();

            let params = value.get("params").cloned().unwrap_or(Value::Null);

            Ok(Message::Notification { method, params })
        } else if has_method {
            #[derive(Deserialize)]
            struct Request {
                id: Id,
                method: String,
                #[serde(default)]
                params: Value,
            }

            let request: Request = serde_json::from_value(value).map_err(de::Error::custom)?;

            Ok(Message::Request {
                id: request.id,
                method: request.method,
                params: request.params,
            })
        } else {
            Err(de::Error::custom("unknown message format"))
        }
    }
}
