use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let mut converted = json!({
                "role": message.role,
                "content": message.content,
            });

            if message.role == Role::Assistant && message.has_tool_calls() {
                let tool_calls: Vec<Value> = message
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.function.name,
                                "arguments": call.function.arguments,
                            }
                        })
                    })
                    .collect();
                converted["tool_calls"] = json!(tool_calls);
            }

            if let Some(id) = &message.tool_call_id {
                converted["tool_call_id"] = json!(id);
            }

            converted
        })
        .collect()
}

/// Convert a single tool into the model-facing function description
pub fn tool_to_openai_spec(tool: &Tool) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }
        result.push(tool_to_openai_spec(tool));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("no response from model"))?;

    // content is null when the model only requests tools
    let content = original
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    let mut message = Message::assistant(content);

    if let Some(tool_calls) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            // Some compatible backends send the arguments as an object instead of text
            let arguments = match &tool_call["function"]["arguments"] {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            message = message.with_tool_call(ToolCall::new(id, name, arguments));
        }
    }

    Ok(message)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "1",
                    "type": "function",
                    "function": {
                        "name": "example_fn",
                        "arguments": "{\"param\": \"value\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let spec = messages_to_openai_spec(&[Message::user("Hello")]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "Hello");
        assert!(spec[0].get("tool_calls").is_none());
    }

    #[test]
    fn test_messages_to_openai_spec_complex() {
        let messages = vec![
            Message::system("You are a travel agent."),
            Message::user("Book the Hilton"),
            Message::assistant("")
                .with_tool_call(ToolCall::new("call_1", "book_hotel", r#"{"hotel_name":"Hilton"}"#)),
            Message::tool("call_1", "booked"),
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 4);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[2]["role"], "assistant");
        assert_eq!(spec[2]["tool_calls"][0]["type"], "function");
        assert_eq!(spec[2]["tool_calls"][0]["function"]["name"], "book_hotel");
        assert_eq!(
            spec[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"hotel_name":"Hilton"}"#
        );
        assert_eq!(spec[3]["role"], "tool");
        assert_eq!(spec[3]["content"], "booked");
        assert_eq!(spec[3]["tool_call_id"], spec[2]["tool_calls"][0]["id"]);
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let tool = Tool::new(
            "test_tool",
            "A test tool",
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Test parameter"
                    }
                },
                "required": ["input"]
            }),
        );

        let spec = tools_to_openai_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "test_tool");
        assert_eq!(spec[0]["function"]["parameters"]["required"], json!(["input"]));
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let tool = Tool::new("test_tool", "Test tool", json!({"type": "object"}));

        let result = tools_to_openai_spec(&[tool.clone(), tool]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_tools_to_openai_spec_empty() -> Result<()> {
        assert!(tools_to_openai_spec(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Hello from John Cena!"
                }
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Hello from John Cena!");
        assert!(!message.has_tool_calls());
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_valid_toolrequest() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        assert_eq!(message.content, "");
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].id, "1");
        assert_eq!(message.tool_calls[0].name(), "example_fn");
        assert_eq!(
            message.tool_calls[0].parse_arguments().unwrap()["param"],
            json!("value")
        );
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_object_arguments() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!({"param": "value"});

        let message = openai_response_to_message(&response)?;
        assert_eq!(
            message.tool_calls[0].parse_arguments().unwrap()["param"],
            json!("value")
        );
        Ok(())
    }

    #[test]
    fn test_openai_response_without_choices() {
        let result = openai_response_to_message(&json!({"choices": []}));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("no response from model"));
    }

    #[test]
    fn test_check_openai_context_length_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });
        let result = check_openai_context_length_error(&error);
        assert!(result.is_some());
        assert_eq!(
            result.unwrap().to_string(),
            "Context length exceeded. Message: This message is too long"
        );

        let error = json!({"code": "other_error", "message": "Some other error"});
        assert!(check_openai_context_length_error(&error).is_none());
    }
}
