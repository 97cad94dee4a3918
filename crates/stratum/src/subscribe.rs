use super::*;

#[derive(Debug, PartialEq, Clone)]
pub struct Subscribe {
    pub user_agent: String,
}

impl Serialize for Subscribe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.user_agent)?;
        seq.end()
    }
}

/// Largest `extranonce2_size` accepted from a pool: the width of the rolled
/// `u64` counter.
pub const MAX_EXTRANONCE2_SIZE: usize = 8;

/// Result of `mining.subscribe`: `[subscriptions, extranonce1, extranonce2_size]`.
#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeResult {
    pub subscriptions: Value,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl SubscribeResult {
    /// Subscription id of the `mining.notify` subscription, if the pool named one.
    pub fn subscription_id(&self) -> Option<String> {
        let subscriptions = self.subscriptions.as_array()?;

        if let Some(id) = subscriptions.get(1).and_then(Value::as_str)
            && subscriptions.first().and_then(Value::as_str) == Some("mining.notify")
        {
            return Some(id.into());
        }

        subscriptions
            .iter()
            .filter_map(Value::as_array)
            .find(|pair| pair.first().and_then(Value::as_str) == Some("mining.notify"))
            .and_then(|pair| pair.get(1))
            .and_then(Value::as_str)
            .map(String::from)
    }
}

impl Serialize for SubscribeResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.subscriptions)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (subscriptions, extranonce1, extranonce2_size) =
            <(Value, Extranonce, u64)>::deserialize(deserializer)?;

        let extranonce2_size = usize::try_from(extranonce2_size)
            .ok()
            .filter(|size| (1..=MAX_EXTRANONCE2_SIZE).contains(size))
            .ok_or_else(|| {
                de::Error::custom(format!(
                    "extranonce2_size {extranonce2_size} outside 1..={MAX_EXTRANONCE2_SIZE}"
                ))
            })?;

        Ok(SubscribeResult {
            subscriptions,
            extranonce1,
            extranonce2_size,
        })
    }
}
