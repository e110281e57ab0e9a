//! Stand-in travel booking tools and the workers built on them.
//!
//! The booking tools do not talk to any reservation system; they confirm
//! whatever they were asked to book.

use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::agent::Agent;
use crate::errors::AgentResult;
use crate::providers::base::Provider;
use crate::registry::{RegisteredTool, ToolRegistry};

pub const HOTEL_ASSISTANT: &str = "hotel_assistant";
pub const FLIGHT_ASSISTANT: &str = "flight_assistant";

pub const HOTEL_ASSISTANT_PROMPT: &str = "你能帮助用户预定酒店。注意，你只需要回答用户有关酒店预定的问题，不需要对其他问题做任何回应或追问。";
pub const FLIGHT_ASSISTANT_PROMPT: &str = "你能帮助用户预定机票。注意，你只需要回答用户有关机票预定的问题，不需要对其他问题做任何回应或追问。";

pub const SUPERVISOR_PROMPT: &str = concat!(
    "您是团队主管，负责管理酒店预订助手和机票预订助手。",
    "如需预定酒店，请交由 hotel_assistant 处理。",
    "如需预定机票，请交由 flight_assistant 处理。",
    "**注意**，你每次最多只能调用一个助理！",
);

pub const DEFAULT_QUERY: &str = "请帮我预定一个北京到上海的机票，然后预定一个当地的酒店。";

fn str_arg<'a>(args: &'a Map<String, Value>, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

pub fn book_hotel_tool() -> RegisteredTool {
    RegisteredTool::local(
        "book_hotel",
        "预定酒店，需要提供酒店名称",
        json!({
            "type": "object",
            "properties": {
                "hotel_name": {"type": "string", "description": "酒店名称"}
            },
            "required": ["hotel_name"]
        }),
        |args| format!("成功预定酒店: {}", str_arg(args, "hotel_name")),
    )
}

pub fn book_flight_tool() -> RegisteredTool {
    RegisteredTool::local(
        "book_flight",
        "预定机票，需要提供出发地和目的地",
        json!({
            "type": "object",
            "properties": {
                "from_airport": {"type": "string", "description": "出发机场"},
                "to_airport": {"type": "string", "description": "到达机场"}
            },
            "required": ["from_airport", "to_airport"]
        }),
        |args| {
            format!(
                "成功预定机票: {} → {}",
                str_arg(args, "from_airport"),
                str_arg(args, "to_airport")
            )
        },
    )
}

fn single_tool_agent(
    name: &str,
    prompt: &str,
    provider: Arc<dyn Provider>,
    tool: RegisteredTool,
) -> AgentResult<Agent> {
    let tools = ToolRegistry::from_tools([tool])?;
    Ok(Agent::new(name, prompt, provider, tools))
}

pub fn hotel_assistant(provider: Arc<dyn Provider>) -> AgentResult<Agent> {
    single_tool_agent(HOTEL_ASSISTANT, HOTEL_ASSISTANT_PROMPT, provider, book_hotel_tool())
}

pub fn flight_assistant(provider: Arc<dyn Provider>) -> AgentResult<Agent> {
    single_tool_agent(
        FLIGHT_ASSISTANT,
        FLIGHT_ASSISTANT_PROMPT,
        provider,
        book_flight_tool(),
    )
}
