use crate::value::Value;
use indexmap::IndexMap;

/// Output of a successful synthesis
///
/// The top level object holds the sections `terraform`, `provider`, `data` and `resource` in this
/// order. Empty sections are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: IndexMap<String, Value>,
}

impl Document {
    pub(crate) fn new(root: IndexMap<String, Value>) -> Self {
        Self { root }
    }

    /// Top level section
    pub fn get(&self, section: &str) -> Option<&Value> {
        self.root.get(section)
    }

    /// Follow object keys from the top level, `["resource", "github_team", "core"]`
    pub fn pointer(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        self.get(first)?.pointer(rest)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Compact json
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Native configuration syntax, see [super::hcl]
    pub fn to_hcl(&self) -> Result<String, hcl::Error> {
        let body = super::hcl::body(self);
        hcl::format::to_string(&body)
    }

    /// Parse a document previously written with [Document::to_json]
    pub fn from_json(json: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl serde::Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.root.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Document::new(IndexMap::deserialize(deserializer)?))
    }
}
