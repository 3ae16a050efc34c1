//! Provider catalog: the known AI backends and the credential fields each one
//! asks for, plus the wire form exchanged with `/api/ai_token`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Reserved schema key listing the mandatory fields of a provider.
pub const REQUIRED_KEY: &str = "required";
/// Reserved top-level key naming the active provider.
pub const IN_USE_KEY: &str = "in_use";
/// First entry of the built-in catalog.
pub const DEFAULT_PROVIDER: &str = "DeepInsight";

/// Field values of one provider plus the names that must be non-empty.
///
/// `required` is held apart from `fields`, so the rendered field set is
/// always exactly `fields.keys()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSchema {
    pub required: Vec<String>,
    pub fields: IndexMap<String, String>,
}

impl ProviderSchema {
    pub fn new<I, K, V>(fields: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            required: required.iter().map(|s| s.to_string()).collect(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r == field)
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Shallow merge of a server entry: every key overwrites or extends, and a
    /// `required` array replaces the local list as a whole.
    fn merge_from(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == REQUIRED_KEY {
                self.required = required_from_value(value);
            } else {
                self.fields.insert(key.clone(), field_text(value));
            }
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if !self.required.is_empty() {
            obj.insert(
                REQUIRED_KEY.to_string(),
                Value::Array(self.required.iter().cloned().map(Value::String).collect()),
            );
        }
        for (key, value) in &self.fields {
            obj.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(obj)
    }
}

fn required_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        Value::String(single) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Ordered provider name -> schema mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCatalog {
    providers: IndexMap<String, ProviderSchema>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers shipped with the client, in display order. The first entry
    /// is the active provider until the server says otherwise.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(DEFAULT_PROVIDER, ProviderSchema::new([("ApiKey", "")], &["ApiKey"]));
        catalog.insert(
            "OpenAI",
            ProviderSchema::new(
                [
                    ("OpenAIKey", ""),
                    ("OpenAIModel", "gpt-3.5-turbo"),
                    ("OpenAIBaseUrl", "https://api.openai.com/v1"),
                    ("HttpProxyHost", ""),
                    ("HttpProxyPort", ""),
                ],
                &["OpenAIKey"],
            ),
        );
        catalog.insert(
            "AzureOpenAI",
            ProviderSchema::new(
                [
                    ("AzureApiKey", ""),
                    ("AzureEndpoint", ""),
                    ("AzureDeploymentName", ""),
                    ("AzureApiVersion", "2023-07-01-preview"),
                ],
                &["AzureApiKey", "AzureEndpoint", "AzureDeploymentName"],
            ),
        );
        catalog.insert(
            "Claude",
            ProviderSchema::new(
                [
                    ("ApiKey", ""),
                    ("ApiSecret", ""),
                    ("Region", "us-east-1"),
                    ("Model", "anthropic.claude-3-sonnet-20240229-v1:0"),
                ],
                &["ApiKey", "ApiSecret"],
            ),
        );
        catalog.insert(
            "DeepSeek",
            ProviderSchema::new(
                [
                    ("ApiKey", ""),
                    ("Model", "deepseek-coder"),
                    ("BaseUrl", "https://api.deepseek.com/chat/completions"),
                ],
                &["ApiKey"],
            ),
        );
        catalog
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: ProviderSchema) {
        self.providers.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&ProviderSchema> {
        self.providers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ProviderSchema> {
        self.providers.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.providers.keys().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderSchema)> {
        self.providers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Configuration as stored on the server: one raw entry per provider plus the
/// `in_use` marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteConfig {
    pub in_use: Option<String>,
    pub providers: IndexMap<String, Value>,
}

impl RemoteConfig {
    /// Parse a `GET /api/ai_token` body. A `{ "code": .., "data": {..} }`
    /// envelope is unwrapped.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(AppError::FetchFailed(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        if obj.contains_key("code") && obj.get("data").is_some_and(Value::is_object) {
            if let Some(Value::Object(inner)) = obj.remove("data") {
                obj = inner;
            }
        }

        let in_use = match obj.get(IN_USE_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        };

        Ok(Self {
            in_use,
            providers: obj
                .into_iter()
                .filter(|(key, _)| key != IN_USE_KEY)
                .collect(),
        })
    }

    /// Build the body sent to `POST /api/ai_token`: every provider of the
    /// catalog with the active one replaced by `active_values`.
    pub fn for_submit(
        catalog: &ProviderCatalog,
        active: &str,
        active_values: &IndexMap<String, String>,
    ) -> Self {
        let mut providers: IndexMap<String, Value> = catalog
            .iter()
            .map(|(name, schema)| (name.to_string(), schema.to_value()))
            .collect();
        let active_obj = active_values
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>();
        providers.insert(active.to_string(), Value::Object(active_obj));

        Self {
            in_use: Some(active.to_string()),
            providers,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(in_use) = &self.in_use {
            obj.insert(IN_USE_KEY.to_string(), Value::String(in_use.clone()));
        }
        for (name, entry) in &self.providers {
            obj.insert(name.clone(), entry.clone());
        }
        Value::Object(obj)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge a server response over a base catalog without touching either input.
///
/// Only providers the server returned an object for are merged, key by key;
/// everything else keeps the base schema. Providers unknown to the base are
/// appended in response order.
pub fn merge_catalog(base: &ProviderCatalog, response: &RemoteConfig) -> ProviderCatalog {
    let mut merged = base.clone();
    for (name, entry) in &response.providers {
        let Value::Object(patch) = entry else {
            log::debug!("skipping empty AI token entry for provider {name}");
            continue;
        };
        match merged.get_mut(name) {
            Some(schema) => schema.merge_from(patch),
            None => {
                let mut schema = ProviderSchema::default();
                schema.merge_from(patch);
                merged.insert(name.clone(), schema);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_catalog_keeps_required_out_of_fields() {
        let catalog = ProviderCatalog::builtin();
        assert_eq!(catalog.first_name(), Some(DEFAULT_PROVIDER));
        for (_, schema) in catalog.iter() {
            assert!(!schema.fields.contains_key(REQUIRED_KEY));
            for req in &schema.required {
                assert!(schema.fields.contains_key(req), "{req} should be a field");
            }
        }
    }

    #[test]
    fn remote_config_parses_in_use_and_providers() {
        let remote = RemoteConfig::from_value(json!({
            "in_use": "OpenAI",
            "OpenAI": { "OpenAIKey": "sk-1" },
            "Claude": null
        }))
        .expect("parse");
        assert_eq!(remote.in_use.as_deref(), Some("OpenAI"));
        assert_eq!(remote.providers.len(), 2);
        assert!(!remote.providers.contains_key(IN_USE_KEY));
    }

    #[test]
    fn remote_config_unwraps_code_data_envelope() {
        let remote = RemoteConfig::from_value(json!({
            "code": 200,
            "data": { "in_use": "Claude", "Claude": { "ApiKey": "k" } }
        }))
        .expect("parse");
        assert_eq!(remote.in_use.as_deref(), Some("Claude"));
        assert!(remote.providers.contains_key("Claude"));
        assert!(!remote.providers.contains_key("code"));
    }

    #[test]
    fn remote_config_rejects_non_object_body() {
        let err = RemoteConfig::from_value(json!(["nope"])).unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(_)));
    }

    #[test]
    fn merge_is_shallow_per_provider_and_keeps_untouched_defaults() {
        let base = ProviderCatalog::builtin();
        let response = RemoteConfig::from_value(json!({
            "in_use": "OpenAI",
            "OpenAI": { "OpenAIKey": "sk-live", "Organization": "acme" },
            "Claude": "",
            "DeepSeek": null
        }))
        .expect("parse");

        let merged = merge_catalog(&base, &response);

        let openai = merged.get("OpenAI").expect("openai");
        assert_eq!(openai.value("OpenAIKey"), Some("sk-live"));
        assert_eq!(openai.value("OpenAIModel"), Some("gpt-3.5-turbo"));
        assert_eq!(openai.value("Organization"), Some("acme"));
        assert_eq!(openai.required, vec!["OpenAIKey".to_string()]);

        assert_eq!(merged.get("Claude"), base.get("Claude"));
        assert_eq!(merged.get("DeepSeek"), base.get("DeepSeek"));
        assert_eq!(base.get("OpenAI").and_then(|s| s.value("OpenAIKey")), Some(""));
    }

    #[test]
    fn merge_replaces_required_and_appends_unknown_providers() {
        let base = ProviderCatalog::builtin();
        let response = RemoteConfig::from_value(json!({
            "in_use": "X",
            "X": { "a": "1", "n": 5, "b": null, "required": ["a"] },
            "DeepInsight": { "required": [] }
        }))
        .expect("parse");

        let merged = merge_catalog(&base, &response);

        let x = merged.get("X").expect("x appended");
        assert_eq!(x.value("a"), Some("1"));
        assert_eq!(x.value("n"), Some("5"));
        assert_eq!(x.value("b"), Some(""));
        assert!(x.is_required("a"));
        assert_eq!(merged.names().last(), Some("X"));
        assert!(merged.get("DeepInsight").expect("di").required.is_empty());
    }

    #[test]
    fn submit_body_replaces_active_entry_exactly() {
        let catalog = ProviderCatalog::builtin();
        let mut values = IndexMap::new();
        values.insert("ApiKey".to_string(), "v".to_string());

        let body = RemoteConfig::for_submit(&catalog, "Claude", &values).to_value();

        assert_eq!(body["in_use"], json!("Claude"));
        assert_eq!(body["Claude"], json!({ "ApiKey": "v" }));
        assert_eq!(
            body["DeepSeek"],
            catalog.get("DeepSeek").expect("deepseek").to_value()
        );
        assert_eq!(body["DeepSeek"]["required"], json!(["ApiKey"]));
    }
}
