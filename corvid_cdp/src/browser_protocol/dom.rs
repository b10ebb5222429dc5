//! `DOM` domain: the node tree operations the Element Handle and Element
//! Finder layers drive (spec §4.G, §4.H).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

use super::page::FrameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendNodeId(pub i64);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: NodeId,
    pub backend_node_id: BackendNodeId,
    pub node_type: i64,
    pub node_name: String,
    pub local_name: String,
    pub node_value: String,
    #[serde(default)]
    pub child_node_count: i64,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub frame_id: Option<FrameId>,
    pub content_document: Option<Box<Node>>,
    pub shadow_root_type: Option<String>,
}

impl Node {
    /// Attribute list decoded as `(name, value)` pairs; CDP sends them as a
    /// flat `[name, value, name, value, ...]` array.
    pub fn attribute_pairs(&self) -> Vec<(String, String)> {
        self.attributes
            .chunks(2)
            .filter_map(|pair| match pair {
                [k, v] => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.enable".into()
    }
}
impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentParams {
    pub depth: Option<i64>,
    pub pierce: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentReturns {
    pub root: Node,
}

impl Method for GetDocumentParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getDocument".into()
    }
}
impl Command for GetDocumentParams {
    type Response = GetDocumentReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorParams {
    pub node_id: NodeId,
    pub selector: String,
}

impl QuerySelectorParams {
    pub fn new(node_id: NodeId, selector: impl Into<String>) -> Self {
        Self {
            node_id,
            selector: selector.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorReturns {
    pub node_id: NodeId,
}

impl Method for QuerySelectorParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.querySelector".into()
    }
}
impl Command for QuerySelectorParams {
    type Response = QuerySelectorReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorAllParams {
    pub node_id: NodeId,
    pub selector: String,
}

impl QuerySelectorAllParams {
    pub fn new(node_id: NodeId, selector: impl Into<String>) -> Self {
        Self {
            node_id,
            selector: selector.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySelectorAllReturns {
    pub node_ids: Vec<NodeId>,
}

impl Method for QuerySelectorAllParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.querySelectorAll".into()
    }
}
impl Command for QuerySelectorAllParams {
    type Response = QuerySelectorAllReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveNodeParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
    pub object_group: Option<String>,
    pub execution_context_id: Option<i64>,
}

impl ResolveNodeParams {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            backend_node_id: None,
            object_group: None,
            execution_context_id: None,
        }
    }

    pub fn for_backend_node(backend_node_id: BackendNodeId) -> Self {
        Self {
            node_id: None,
            backend_node_id: Some(backend_node_id),
            object_group: None,
            execution_context_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveNodeReturns {
    pub object: super::super::js_protocol::runtime::RemoteObject,
}

impl Method for ResolveNodeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.resolveNode".into()
    }
}
impl Command for ResolveNodeParams {
    type Response = ResolveNodeReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
    pub object_id: Option<super::super::js_protocol::runtime::RemoteObjectId>,
    pub depth: Option<i64>,
    pub pierce: Option<bool>,
}

impl DescribeNodeParams {
    pub fn for_object(
        object_id: super::super::js_protocol::runtime::RemoteObjectId,
    ) -> Self {
        Self {
            object_id: Some(object_id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeReturns {
    pub node: Node,
}

impl Method for DescribeNodeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.describeNode".into()
    }
}
impl Command for DescribeNodeParams {
    type Response = DescribeNodeReturns;
}

/// Finds the `<iframe>`/`<frame>` element that owns a given frame, the
/// lookup the Frame Resolver's owner-matching step is built on (spec §4.I
/// step 3).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFrameOwnerParams {
    pub frame_id: super::page::FrameId,
}

impl GetFrameOwnerParams {
    pub fn new(frame_id: super::page::FrameId) -> Self {
        Self { frame_id }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFrameOwnerReturns {
    pub backend_node_id: BackendNodeId,
    pub node_id: Option<NodeId>,
}

impl Method for GetFrameOwnerParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getFrameOwner".into()
    }
}
impl Command for GetFrameOwnerParams {
    type Response = GetFrameOwnerReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollIntoViewIfNeededParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
}

impl ScrollIntoViewIfNeededParams {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            backend_node_id: None,
        }
    }
}

impl Method for ScrollIntoViewIfNeededParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.scrollIntoViewIfNeeded".into()
    }
}
impl Command for ScrollIntoViewIfNeededParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBoxModelParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
}

impl GetBoxModelParams {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            backend_node_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxModel {
    pub content: Vec<f64>,
    pub padding: Vec<f64>,
    pub border: Vec<f64>,
    pub margin: Vec<f64>,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBoxModelReturns {
    pub model: BoxModel,
}

impl Method for GetBoxModelParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getBoxModel".into()
    }
}
impl Command for GetBoxModelParams {
    type Response = GetBoxModelReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAttributeValueParams {
    pub node_id: NodeId,
    pub name: String,
    pub value: String,
}

impl Method for SetAttributeValueParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.setAttributeValue".into()
    }
}
impl Command for SetAttributeValueParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
}

impl FocusParams {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            backend_node_id: None,
        }
    }
}

impl Method for FocusParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.focus".into()
    }
}
impl Command for FocusParams {
    type Response = serde_json::Value;
}

/// Starts a search over the whole document for `query`, which may be a
/// plain string, a CSS selector or an XPath expression — the primitive the
/// Element Finder's XPath strategies are built on (spec §4.H), since `DOM`
/// has no direct `querySelector`-by-XPath call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSearchParams {
    pub query: String,
    pub include_user_agent_shadow_dom: Option<bool>,
}

impl PerformSearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            include_user_agent_shadow_dom: Some(true),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSearchReturns {
    pub search_id: String,
    pub result_count: i64,
}

impl Method for PerformSearchParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.performSearch".into()
    }
}
impl Command for PerformSearchParams {
    type Response = PerformSearchReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSearchResultsParams {
    pub search_id: String,
    pub from_index: i64,
    pub to_index: i64,
}

impl GetSearchResultsParams {
    pub fn new(search_id: impl Into<String>, count: i64) -> Self {
        Self {
            search_id: search_id.into(),
            from_index: 0,
            to_index: count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSearchResultsReturns {
    pub node_ids: Vec<NodeId>,
}

impl Method for GetSearchResultsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getSearchResults".into()
    }
}
impl Command for GetSearchResultsParams {
    type Response = GetSearchResultsReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardSearchResultsParams {
    pub search_id: String,
}

impl Method for DiscardSearchResultsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.discardSearchResults".into()
    }
}
impl Command for DiscardSearchResultsParams {
    type Response = serde_json::Value;
}

/// Serialized HTML for a node and its subtree — the basis for the Element
/// Handle's outer-HTML/visible-text extraction (spec §4.G).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOuterHTMLParams {
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
    pub object_id: Option<super::super::js_protocol::runtime::RemoteObjectId>,
}

impl GetOuterHTMLParams {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            backend_node_id: None,
            object_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOuterHTMLReturns {
    pub outer_html: String,
}

impl Method for GetOuterHTMLParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getOuterHTML".into()
    }
}
impl Command for GetOuterHTMLParams {
    type Response = GetOuterHTMLReturns;
}

/// Sets the files an `<input type="file">` accepts, driving
/// `WebElement::set_input_files` (spec §4.G).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFileInputFilesParams {
    pub files: Vec<String>,
    pub node_id: Option<NodeId>,
    pub backend_node_id: Option<BackendNodeId>,
}

impl SetFileInputFilesParams {
    pub fn new(node_id: NodeId, files: Vec<String>) -> Self {
        Self {
            files,
            node_id: Some(node_id),
            backend_node_id: None,
        }
    }
}

impl Method for SetFileInputFilesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.setFileInputFiles".into()
    }
}
impl Command for SetFileInputFilesParams {
    type Response = serde_json::Value;
}

// --- events ------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocumentUpdated {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSetChildNodes {
    pub parent_id: NodeId,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttributeModified {
    pub node_id: NodeId,
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_attribute_list_into_pairs() {
        let n = Node {
            node_id: NodeId(1),
            backend_node_id: BackendNodeId(1),
            node_type: 1,
            node_name: "DIV".into(),
            local_name: "div".into(),
            node_value: String::new(),
            child_node_count: 0,
            children: vec![],
            attributes: vec!["id".into(), "main".into(), "class".into(), "wrap".into()],
            frame_id: None,
            content_document: None,
            shadow_root_type: None,
        };
        assert_eq!(
            n.attribute_pairs(),
            vec![
                ("id".to_string(), "main".to_string()),
                ("class".to_string(), "wrap".to_string())
            ]
        );
    }
}
