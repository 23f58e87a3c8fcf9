//! API definition document.
//!
//! The document is assembled from two pieces kept in code:
//!
//! - a declarative table of [`RouteSpec`] entries, one per operation,
//!   maintained next to the handlers
//! - typed [`SchemaNode`] trees describing request and response bodies
//!
//! [`document`] serializes both into an OpenAPI 3 JSON document. Nothing is
//! discovered at runtime: a new route must be added to the table.

use actions_core::ReferenceData;
use serde_json::{Map, Value, json};

/// A JSON schema fragment.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaNode {
    /// An object with named properties.
    Object {
        /// Properties in declaration order.
        properties: Vec<(&'static str, SchemaNode)>,
        /// Names of required properties.
        required: Vec<&'static str>,
    },
    /// An array of items.
    Array(Box<SchemaNode>),
    /// A string, optionally with a format and length bounds.
    String {
        /// OpenAPI format (`uuid`, `date-time`).
        format: Option<&'static str>,
        /// Minimum length.
        min_length: Option<usize>,
        /// Maximum length.
        max_length: Option<usize>,
    },
    /// An integer-coded enumeration.
    Enum {
        /// Type name.
        name: &'static str,
        /// `(code, description)` pairs.
        values: Vec<(i32, &'static str)>,
    },
    /// A reference to a named component schema.
    Ref(&'static str),
}

impl SchemaNode {
    /// Plain string.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            format: None,
            min_length: None,
            max_length: None,
        }
    }

    /// String with a maximum length.
    #[must_use]
    pub const fn bounded_string(max_length: usize) -> Self {
        Self::String {
            format: None,
            min_length: None,
            max_length: Some(max_length),
        }
    }

    /// String with an exact length.
    #[must_use]
    pub const fn fixed_string(length: usize) -> Self {
        Self::String {
            format: None,
            min_length: Some(length),
            max_length: Some(length),
        }
    }

    /// UUID string.
    #[must_use]
    pub const fn uuid() -> Self {
        Self::String {
            format: Some("uuid"),
            min_length: None,
            max_length: None,
        }
    }

    /// ISO-8601 date-time string.
    #[must_use]
    pub const fn date_time() -> Self {
        Self::String {
            format: Some("date-time"),
            min_length: None,
            max_length: None,
        }
    }

    /// Enumeration of every value of `T`.
    #[must_use]
    pub fn reference_data<T: ReferenceData>() -> Self {
        Self::Enum {
            name: T::NAME,
            values: T::ALL
                .iter()
                .map(|value| (value.code(), value.description()))
                .collect(),
        }
    }

    /// Array of `item`.
    #[must_use]
    pub fn array(item: Self) -> Self {
        Self::Array(Box::new(item))
    }

    /// Render as an OpenAPI schema object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Object {
                properties,
                required,
            } => {
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, node)| ((*name).to_string(), node.to_json()))
                    .collect();
                let mut schema = json!({ "type": "object", "properties": properties });
                if !required.is_empty() {
                    schema["required"] = json!(required);
                }
                schema
            },
            Self::Array(item) => json!({ "type": "array", "items": item.to_json() }),
            Self::String {
                format,
                min_length,
                max_length,
            } => {
                let mut schema = json!({ "type": "string" });
                if let Some(format) = format {
                    schema["format"] = json!(format);
                }
                if let Some(min_length) = min_length {
                    schema["minLength"] = json!(min_length);
                }
                if let Some(max_length) = max_length {
                    schema["maxLength"] = json!(max_length);
                }
                schema
            },
            Self::Enum { name, values } => {
                let codes: Vec<i32> = values.iter().map(|(code, _)| *code).collect();
                let described: Vec<String> = values
                    .iter()
                    .map(|(code, description)| format!("{code} = {description}"))
                    .collect();
                json!({
                    "type": "integer",
                    "format": "int32",
                    "enum": codes,
                    "description": format!("{name}: {}", described.join(", ")),
                })
            },
            Self::Ref(name) => json!({ "$ref": format!("#/components/schemas/{name}") }),
        }
    }
}

/// HTTP method of a documented operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
}

impl Method {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Patch => "patch",
        }
    }
}

/// A documented response.
#[derive(Clone, Copy, Debug)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable description.
    pub description: &'static str,
    /// Name of the component schema of the body, if any.
    pub schema: Option<BodySchema>,
}

/// Shape of a request or response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodySchema {
    /// A single component schema.
    One(&'static str),
    /// An array of a component schema.
    Many(&'static str),
}

impl BodySchema {
    fn to_json(self) -> Value {
        match self {
            Self::One(name) => SchemaNode::Ref(name).to_json(),
            Self::Many(name) => SchemaNode::array(SchemaNode::Ref(name)).to_json(),
        }
    }
}

/// One documented operation.
#[derive(Clone, Copy, Debug)]
pub struct RouteSpec {
    /// HTTP method.
    pub method: Method,
    /// OpenAPI path template, e.g. `/api/Customers/{customerId}`.
    pub path: &'static str,
    /// Unique operation id.
    pub operation_id: &'static str,
    /// One-line summary.
    pub summary: &'static str,
    /// Required request headers.
    pub headers: &'static [&'static str],
    /// Request body, if any.
    pub request_body: Option<BodySchema>,
    /// Documented responses.
    pub responses: &'static [ResponseSpec],
}

impl RouteSpec {
    fn path_parameters(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
    }

    fn to_json(&self) -> Value {
        let mut parameters: Vec<Value> = self
            .path_parameters()
            .map(|name| {
                json!({
                    "name": name,
                    "in": "path",
                    "required": true,
                    "schema": SchemaNode::uuid().to_json(),
                })
            })
            .collect();
        parameters.extend(self.headers.iter().map(|name| {
            json!({
                "name": name,
                "in": "header",
                "required": true,
                "schema": SchemaNode::string().to_json(),
            })
        }));

        let responses: Map<String, Value> = self
            .responses
            .iter()
            .map(|response| {
                let mut body = json!({ "description": response.description });
                if let Some(schema) = response.schema {
                    body["content"] = json!({ "application/json": { "schema": schema.to_json() } });
                }
                (response.status.to_string(), body)
            })
            .collect();

        let mut operation = json!({
            "operationId": self.operation_id,
            "summary": self.summary,
            "parameters": parameters,
            "responses": responses,
        });
        if let Some(body) = self.request_body {
            operation["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": body.to_json() } },
            });
        }
        operation
    }
}

/// Convert an OpenAPI path template to Axum's `:param` syntax.
///
/// ```
/// use actions_web::openapi::axum_path;
///
/// assert_eq!(axum_path("/api/Customers/{customerId}/Actions"), "/api/Customers/:customerId/Actions");
/// ```
#[must_use]
pub fn axum_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map_or_else(|| segment.to_string(), |name| format!(":{name}"))
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Assemble an OpenAPI 3 document.
#[must_use]
pub fn document(
    title: &str,
    version: &str,
    routes: &[RouteSpec],
    schemas: &[(&'static str, SchemaNode)],
) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let entry = paths
            .entry(route.path.to_string())
            .or_insert_with(|| json!({}));
        entry[route.method.as_str()] = route.to_json();
    }

    let components: Map<String, Value> = schemas
        .iter()
        .map(|(name, node)| ((*name).to_string(), node.to_json()))
        .collect();

    json!({
        "openapi": "3.0.1",
        "info": { "title": title, "version": version },
        "paths": paths,
        "components": { "schemas": components },
    })
}
