//! Agent prompts
//!
//! System persona, tool listing, and the strict JSON-in-markdown response
//! format the output parser depends on.

use crate::agent::tools::Tool;
use std::sync::Arc;

/// System persona for the agent.
pub const SYSTEM_PREFIX: &str = "Ustaad AI is an AI-powered assistant developed by ProjectHero for the construction industry.
It provides quick and accurate answers to construction-related questions using a large language model and a verified knowledge base.
Its purpose is to enhance the efficiency of users by delivering reliable information and empowering them with immediate access to knowledge.
Ustaad AI ensures accuracy by cross-checking data with the knowledge base and continually improves through user feedback.
Its goal is to empower construction workers and contractors, improving job satisfaction and productivity.";

const FORMAT_INSTRUCTIONS: &str = r#"RESPONSE FORMAT INSTRUCTIONS
----------------------------

Output a JSON markdown code snippet containing a valid JSON object in one of two formats:

**Option 1:**
Use this if you want to use a tool.
Markdown code snippet formatted in the following schema:

```json
{
    "action": string // The action to take. Must be one of [{tool_names}]
    "action_input": string // The input to the action. May be a stringified object.
}
```

**Option #2:**
Use this if you want to respond directly and conversationally to the human. Markdown code snippet formatted in the following schema:

```json
{
    "action": "Final Answer",
    "action_input": string // You should put what you want to return to use here and make sure to use valid json newline characters.
}
```

For both options, remember to always include the surrounding markdown code snippet delimiters (begin with "```json" and end with "```")!
"#;

const USER_SUFFIX: &str = r#"TOOLS
------
You can use tools to look up information that may be helpful in answering the users original question. The tools the assistant can use are:

{tools}

MOST IMPORTANT INSTRUCTIONS
--------------------

Evaluate carefully whether or not you should use a tool based on the input and the tools decription.
Feel free to use multiple tools if you are not satisfied with the results of the first tool you use.
If you do not use a tool, you will be expected to respond directly to the user's input. If you do use a tool, you will be expected to respond with the details of the tool you want to use.

{format_instructions}

USER'S INPUT
--------------------
Here is the user's input (remember to respond with a markdown code snippet of a json blob with a single action, and NOTHING else):

{input}"#;

const TOOL_RESPONSE: &str = r#"TOOL RESPONSE:
---------------------
{observation}

USER'S INPUT
--------------------

Okay, so what is the response to my original question? If using information from tools, you must say it explicitly - I have forgotten all TOOL RESPONSES! Remember to respond with a markdown code snippet of a json blob with a single action, and NOTHING else."#;

/// Corrective reprompt sent once when the model's output cannot be parsed.
pub const REFORMAT_REQUEST: &str = "Your last response could not be parsed. Respond again with a markdown code snippet of a json blob with a single action, and NOTHING else.";

/// Render the user message carrying tool listing, format instructions and
/// the user's input.
pub fn render_user_input(input: &str, tools: &[Arc<dyn Tool>]) -> String {
    let tool_listing = tools
        .iter()
        .map(|t| format!("{}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n");

    let tool_names = tools
        .iter()
        .map(|t| t.name().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let format_instructions = FORMAT_INSTRUCTIONS.replace("{tool_names}", &tool_names);

    USER_SUFFIX
        .replace("{tools}", &tool_listing)
        .replace("{format_instructions}", &format_instructions)
        .replace("{input}", input)
}

/// Render a tool observation as the next user message.
pub fn render_tool_response(observation: &str) -> String {
    TOOL_RESPONSE.replace("{observation}", observation)
}
