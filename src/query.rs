use std::fmt;

use graphql_client::QueryBody;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// GraphQL-over-HTTP request body
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
        }
    }

    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Builds a request from a `graphql_client` generated operation
    pub fn from_query_body<V: Serialize>(body: QueryBody<V>) -> Result<Self, serde_json::Error> {
        let variables = serde_json::to_value(&body.variables)?;
        Ok(Self {
            query: body.query.to_string(),
            variables: match variables {
                Value::Null => None,
                v => Some(v),
            },
            operation_name: Some(body.operation_name.to_string()),
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GraphQlError {
    pub message: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Some servers send `"errors": null` instead of omitting the key
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            let rendered: Vec<String> = path
                .iter()
                .map(|seg| match seg {
                    PathSegment::Field(name) => name.clone(),
                    PathSegment::Index(idx) => idx.to_string(),
                })
                .collect();
            write!(f, " (at {})", rendered.join("."))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization_omits_empty_fields() {
        let req = GraphQlRequest::new("{ domains { id } }");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({ "query": "{ domains { id } }" }));

        let req = req
            .variables(json!({ "name": "vitalik.eth" }))
            .operation_name("Lookup");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["operationName"], "Lookup");
        assert_eq!(body["variables"]["name"], "vitalik.eth");
    }

    #[test]
    fn test_from_query_body() {
        #[derive(Serialize)]
        struct Vars {
            name: String,
        }
        let body = QueryBody {
            variables: Vars {
                name: "nick.eth".to_string(),
            },
            query: "query Lookup($name: String!) { domains(where: { name: $name }) { id } }",
            operation_name: "Lookup",
        };
        let req = GraphQlRequest::from_query_body(body).unwrap();
        assert_eq!(req.operation_name.as_deref(), Some("Lookup"));
        assert_eq!(req.variables, Some(json!({ "name": "nick.eth" })));
    }

    #[test]
    fn test_response_with_errors() {
        let raw = json!({
            "data": null,
            "errors": [{
                "message": "Type `Query` has no field `nope`",
                "locations": [{ "line": 1, "column": 3 }],
                "path": ["domains", 0, "nope"]
            }]
        });
        let resp: GraphQlResponse = serde_json::from_value(raw).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(
            resp.errors[0].to_string(),
            "Type `Query` has no field `nope` (at domains.0.nope)"
        );
    }

    #[test]
    fn test_null_errors_and_locations_read_as_empty() {
        let resp: GraphQlResponse =
            serde_json::from_value(json!({ "data": { "a": 1 }, "errors": null })).unwrap();
        assert_eq!(resp.data, Some(json!({ "a": 1 })));
        assert!(resp.errors.is_empty());

        let resp: GraphQlResponse = serde_json::from_value(json!({
            "errors": [{ "message": "boom", "locations": null, "path": null }]
        }))
        .unwrap();
        assert_eq!(resp.errors[0].message, "boom");
        assert!(resp.errors[0].locations.is_empty());
        assert_eq!(resp.errors[0].path, None);
    }
}
