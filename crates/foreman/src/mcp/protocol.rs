use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const TOOLS_CALL_METHOD: &str = "tools/call";

/// A tool as announced on a provider's event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

#[derive(Debug, Deserialize)]
struct ToolsAnnouncement {
    tools: Vec<McpToolDef>,
}

/// Decode one event payload as a tool announcement.
///
/// Streams carry other events too (endpoint hints, pings, progress), so any
/// payload that does not have the announcement shape yields `None`.
pub fn parse_tool_announcement(payload: &str) -> Option<Vec<McpToolDef>> {
    serde_json::from_str::<ToolsAnnouncement>(payload)
        .ok()
        .map(|announcement| announcement.tools)
}

#[derive(Debug, Clone, Serialize)]
pub struct CallToolRequest<'a> {
    pub method: &'static str,
    pub params: CallToolParams<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallToolParams<'a> {
    pub name: &'a str,
    pub arguments: &'a Map<String, Value>,
}

impl<'a> CallToolRequest<'a> {
    pub fn new(name: &'a str, arguments: &'a Map<String, Value>) -> Self {
        Self {
            method: TOOLS_CALL_METHOD,
            params: CallToolParams { name, arguments },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ResultContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultContent {
    #[serde(default)]
    pub text: String,
}

impl CallToolResult {
    /// The text of the first content entry, empty when there is none
    pub fn into_text(self) -> String {
        self.content
            .into_iter()
            .next()
            .map(|content| content.text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_announcement() {
        let payload = r#"{"tools": [
            {"name": "place_search", "description": "Search places", "inputSchema": {"type": "object", "properties": {"keyword": {"type": "string"}}}},
            {"name": "route_plan"}
        ]}"#;

        let tools = parse_tool_announcement(payload).unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "place_search");
        assert_eq!(tools[0].input_schema["properties"]["keyword"]["type"], "string");
        assert_eq!(tools[1].description, "");
        assert_eq!(tools[1].input_schema["type"], "object");
    }

    #[test]
    fn test_other_payloads_are_ignored() {
        assert!(parse_tool_announcement("/messages?session_id=42").is_none());
        assert!(parse_tool_announcement(r#"{"jsonrpc": "2.0", "method": "ping"}"#).is_none());
        assert!(parse_tool_announcement("").is_none());
    }

    #[test]
    fn test_call_request_shape() {
        let mut arguments = Map::new();
        arguments.insert("keyword".to_string(), json!("hotpot"));
        let request = CallToolRequest::new("place_search", &arguments);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "tools/call",
                "params": {"name": "place_search", "arguments": {"keyword": "hotpot"}}
            })
        );
    }

    #[test]
    fn test_call_result_text() {
        let result: CallToolResult =
            serde_json::from_value(json!({"content": [{"text": "OK"}, {"text": "ignored"}]}))
                .unwrap();
        assert_eq!(result.into_text(), "OK");

        let result: CallToolResult = serde_json::from_value(json!({"content": []})).unwrap();
        assert_eq!(result.into_text(), "");

        let result: CallToolResult = serde_json::from_value(json!({"isError": false})).unwrap();
        assert_eq!(result.into_text(), "");
    }
}
