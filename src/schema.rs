//! Tool input schemas.

use rmcp::model::JsonObject;
use rmcp::schemars::{self, JsonSchema, generate::SchemaSettings};
use std::sync::Arc;

/// Generates an inline JSON schema for a tool request.
///
/// Subschemas are inlined rather than referenced through `$ref`, which some MCP
/// clients cannot render.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let schema = settings.into_generator().into_root_schema_for::<T>();
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        other => {
            tracing::error!("Tool schema is not a JSON object: {:?}", other);
            Arc::new(JsonObject::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SearchSymbolsRequest;
    use assert2::check;

    #[test]
    fn test_search_schema_has_query() {
        let schema = inline_schema_for_type::<SearchSymbolsRequest>();
        let properties = schema.get("properties").and_then(|p| p.as_object());
        check!(properties.is_some_and(|p| p.contains_key("query") && p.contains_key("limit")));
        check!(!schema.contains_key("$defs"));
    }
}
