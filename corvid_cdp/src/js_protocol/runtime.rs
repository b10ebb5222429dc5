//! `Runtime` domain: expression evaluation and the remote-object wrappers
//! returned by `DOM.resolveNode` / `Runtime.callFunctionOn` (spec §4.G).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteObjectId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionContextId(pub i64);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    pub r#type: String,
    pub subtype: Option<String>,
    pub class_name: Option<String>,
    pub value: Option<Value>,
    pub description: Option<String>,
    pub object_id: Option<RemoteObjectId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub exception_id: i64,
    pub text: String,
    pub line_number: i64,
    pub column_number: i64,
    pub exception: Option<RemoteObject>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Runtime.enable".into()
    }
}
impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    pub expression: String,
    pub context_id: Option<ExecutionContextId>,
    pub return_by_value: Option<bool>,
    pub await_promise: Option<bool>,
    pub user_gesture: Option<bool>,
    pub silent: Option<bool>,
}

impl EvaluateParams {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            context_id: None,
            return_by_value: Some(true),
            await_promise: Some(true),
            user_gesture: None,
            silent: None,
        }
    }

    pub fn in_context(mut self, context_id: ExecutionContextId) -> Self {
        self.context_id = Some(context_id);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateReturns {
    pub result: RemoteObject,
    pub exception_details: Option<ExceptionDetails>,
}

impl Method for EvaluateParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Runtime.evaluate".into()
    }
}
impl Command for EvaluateParams {
    type Response = EvaluateReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallArgument {
    pub value: Option<Value>,
    pub object_id: Option<RemoteObjectId>,
}

impl From<Value> for CallArgument {
    fn from(value: Value) -> Self {
        Self {
            value: Some(value),
            object_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    pub function_declaration: String,
    pub object_id: Option<RemoteObjectId>,
    #[serde(default)]
    pub arguments: Vec<CallArgument>,
    pub return_by_value: Option<bool>,
    pub await_promise: Option<bool>,
    pub execution_context_id: Option<ExecutionContextId>,
}

impl CallFunctionOnParams {
    pub fn on_object(object_id: RemoteObjectId, function_declaration: impl Into<String>) -> Self {
        Self {
            function_declaration: function_declaration.into(),
            object_id: Some(object_id),
            arguments: Vec::new(),
            return_by_value: Some(true),
            await_promise: Some(true),
            execution_context_id: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<CallArgument>) -> Self {
        self.arguments = arguments;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnReturns {
    pub result: RemoteObject,
    pub exception_details: Option<ExceptionDetails>,
}

impl Method for CallFunctionOnParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Runtime.callFunctionOn".into()
    }
}
impl Command for CallFunctionOnParams {
    type Response = CallFunctionOnReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObjectParams {
    pub object_id: RemoteObjectId,
}

impl ReleaseObjectParams {
    pub fn new(object_id: RemoteObjectId) -> Self {
        Self { object_id }
    }
}

impl Method for ReleaseObjectParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Runtime.releaseObject".into()
    }
}
impl Command for ReleaseObjectParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExecutionContextCreated {
    pub context: ExecutionContextDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDescription {
    pub id: ExecutionContextId,
    pub origin: String,
    pub name: String,
    pub aux_data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExecutionContextDestroyed {
    pub execution_context_id: ExecutionContextId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExecutionContextsCleared {}
