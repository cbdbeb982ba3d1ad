use serde_json::{json, Value};

/// Document list query, sent as a JSON string in a repeated `queries[]` parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    Equal(String, Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal(attribute.into(), value.into())
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Self::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Self::OrderDesc(attribute.into())
    }

    #[must_use]
    pub fn limit(limit: u32) -> Self {
        Self::Limit(limit)
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        let value = match self {
            Self::Equal(attribute, value) => {
                // A scalar is wrapped; the backend matches any of the listed values.
                let values = match value {
                    Value::Array(values) => values.clone(),
                    other => vec![other.clone()],
                };
                json!({"method": "equal", "attribute": attribute, "values": values})
            }
            Self::OrderAsc(attribute) => json!({"method": "orderAsc", "attribute": attribute}),
            Self::OrderDesc(attribute) => json!({"method": "orderDesc", "attribute": attribute}),
            Self::Limit(limit) => json!({"method": "limit", "values": [limit]}),
        };
        value.to_string()
    }
}

/// Encode queries as `(queries[], json)` pairs for `RequestBuilder::query`.
pub(crate) fn to_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    queries.iter().map(|q| ("queries[]", q.to_json())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(query: &Query) -> Value {
        serde_json::from_str(&query.to_json()).unwrap()
    }

    #[test]
    fn equal_wraps_scalar_values() {
        let value = parse(&Query::equal("isAvailable", true));
        assert_eq!(value["method"], "equal");
        assert_eq!(value["attribute"], "isAvailable");
        assert_eq!(value["values"], json!([true]));
    }

    #[test]
    fn equal_keeps_array_values() {
        let value = parse(&Query::equal("role", json!(["donor", "volunteer"])));
        assert_eq!(value["values"], json!(["donor", "volunteer"]));
    }

    #[test]
    fn order_and_limit_shapes() {
        assert_eq!(
            parse(&Query::order_asc("date")),
            json!({"method": "orderAsc", "attribute": "date"})
        );
        assert_eq!(
            parse(&Query::order_desc("$createdAt")),
            json!({"method": "orderDesc", "attribute": "$createdAt"})
        );
        assert_eq!(
            parse(&Query::limit(25)),
            json!({"method": "limit", "values": [25]})
        );
    }

    #[test]
    fn params_use_repeated_key() {
        let params = to_params(&[Query::limit(1), Query::order_asc("date")]);
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(key, _)| *key == "queries[]"));
    }
}
