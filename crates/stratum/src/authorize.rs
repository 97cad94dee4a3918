use super::*;

#[derive(Debug, PartialEq, Clone)]
pub struct Authorize {
    pub username: String,
    pub password: Option<String>,
}

impl Serialize for Authorize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(if self.password.is_some() { 2 } else { 1 }))?;
        seq.serialize_element(&self.username)?;
        if let Some(password) = &self.password {
            seq.serialize_element(password)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Authorize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (username, password) = <(String, Option<String>)>::deserialize(deserializer)?;
        Ok(Authorize { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_shape() {
        assert_eq!(
            serde_json::to_value(Authorize {
                username: "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH.pickaxe".into(),
                password: Some("x".into()),
            })
            .unwrap(),
            serde_json::json!(["1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH.pickaxe", "x"])
        );

        assert_eq!(
            serde_json::to_value(Authorize {
                username: "worker".into(),
                password: None,
            })
            .unwrap(),
            serde_json::json!(["worker"])
        );
    }
}
