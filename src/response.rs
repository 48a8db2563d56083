use rmcp::model::{CallToolResult, Content};

use crate::executor::ExecutionOutcome;

/// Map an execution outcome onto the tool result sent back to the client
pub fn into_call_tool_result(outcome: ExecutionOutcome) -> CallToolResult {
    match outcome {
        ExecutionOutcome::Success { stdout } => CallToolResult::success(vec![Content::text(stdout)]),
        ExecutionOutcome::Failure { message } => CallToolResult::error(vec![Content::text(message)]),
    }
}
