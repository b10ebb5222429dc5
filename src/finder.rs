//! Element Finder (spec §4.H): shared by `Tab` and `WebElement` — builds a
//! strategy from either a keyword attribute bag or an explicit selector,
//! resolves it against a root node, and polls until something matches or
//! the caller's timeout elapses.

use std::time::{Duration, Instant};

use corvid_cdp::browser_protocol::dom::{
    DescribeNodeParams, DiscardSearchResultsParams, GetSearchResultsParams, NodeId,
    PerformSearchParams, QuerySelectorAllParams, QuerySelectorParams, ResolveNodeParams,
};

use crate::element::{Element, IFrameBinding};
use crate::error::{CdpError, Result};
use crate::routing::Routing;

/// Keyword-style inputs to a find (spec §4.H). Hyphenated HTML attributes
/// such as `data-testid`/`aria-label` are supplied with underscores in
/// `extra` (`data_testid`) and converted to hyphenated form here.
#[derive(Debug, Default, Clone)]
pub struct AttributeBag {
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub r#type: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl AttributeBag {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(v) = &self.id {
            out.push(("id", v.as_str()));
        }
        if let Some(v) = &self.class_name {
            out.push(("class", v.as_str()));
        }
        if let Some(v) = &self.tag_name {
            out.push(("tag", v.as_str()));
        }
        if let Some(v) = &self.name {
            out.push(("name", v.as_str()));
        }
        if let Some(v) = &self.text {
            out.push(("text", v.as_str()));
        }
        if let Some(v) = &self.r#type {
            out.push(("type", v.as_str()));
        }
        out
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty() && self.extra.is_empty()
    }
}

/// What to search for, in the shape `find`/`query` callers provide it.
pub enum FindBy {
    Attributes(AttributeBag),
    /// An explicit selector. `force_xpath`/`force_css` override the
    /// leading-character auto-classification; `None` lets [`classify`] decide.
    Query { expr: String, xpath: Option<bool> },
}

/// `/` or `(` at the start means XPath, otherwise CSS (spec §4.H).
fn classify(expr: &str) -> bool {
    matches!(expr.chars().next(), Some('/') | Some('('))
}

enum Strategy {
    QuerySelector(String),
    QuerySelectorAll(String),
    XPath(String),
}

/// Builds the CSS/XPath strategy the table in spec §4.H names, given however
/// many attributes were provided.
fn strategy_for_bag(bag: &AttributeBag) -> Result<Strategy> {
    if bag.is_empty() {
        return Err(CdpError::InvalidCommand(
            "find requires at least one attribute or an explicit query".into(),
        ));
    }

    let total = bag.entries().len() + bag.extra.len();
    if total == 1 {
        if let Some(v) = &bag.id {
            return Ok(Strategy::QuerySelector(format!("#{v}")));
        }
        if let Some(v) = &bag.class_name {
            return Ok(Strategy::QuerySelectorAll(format!(".{v}")));
        }
        if let Some(v) = &bag.tag_name {
            return Ok(Strategy::QuerySelectorAll(v.clone()));
        }
        if let Some(v) = &bag.name {
            return Ok(Strategy::QuerySelectorAll(format!("[name=\"{v}\"]")));
        }
        if let Some(v) = &bag.text {
            return Ok(Strategy::XPath(format!(
                "//*[normalize-space()=\"{v}\"]"
            )));
        }
        if let Some(v) = &bag.r#type {
            return Ok(Strategy::QuerySelectorAll(format!("[type=\"{v}\"]")));
        }
        if let Some((k, v)) = bag.extra.first() {
            return Ok(Strategy::QuerySelectorAll(format!(
                "[{}=\"{v}\"]",
                k.replace('_', "-")
            )));
        }
        unreachable!("total == 1 implies one of the above matched");
    }

    // Multiple attributes: conjoin into a single XPath predicate, scoped by
    // tag name when one was given.
    let element = bag.tag_name.as_deref().unwrap_or("*");
    let mut predicates = Vec::new();
    if let Some(v) = &bag.id {
        predicates.push(format!("@id=\"{v}\""));
    }
    if let Some(v) = &bag.class_name {
        predicates.push(format!(
            "contains(concat(' ', normalize-space(@class), ' '), ' {v} ')"
        ));
    }
    if let Some(v) = &bag.name {
        predicates.push(format!("@name=\"{v}\""));
    }
    if let Some(v) = &bag.text {
        predicates.push(format!("normalize-space()=\"{v}\""));
    }
    if let Some(v) = &bag.r#type {
        predicates.push(format!("@type=\"{v}\""));
    }
    for (k, v) in &bag.extra {
        predicates.push(format!("@{}=\"{v}\"", k.replace('_', "-")));
    }
    Ok(Strategy::XPath(format!(
        "//{element}[{}]",
        predicates.join(" and ")
    )))
}

fn strategy_for_query(expr: &str, xpath: Option<bool>) -> Strategy {
    let is_xpath = xpath.unwrap_or_else(|| classify(expr));
    if is_xpath {
        Strategy::XPath(expr.to_string())
    } else {
        Strategy::QuerySelectorAll(expr.to_string())
    }
}

/// One attempt at resolving `by` against `root`, with no waiting. Used both
/// as the first try and as each iteration of the polling loop.
async fn try_find(routing: &Routing, root: NodeId, by: &FindBy) -> Result<Vec<NodeId>> {
    let strategy = match by {
        FindBy::Attributes(bag) => strategy_for_bag(bag)?,
        FindBy::Query { expr, xpath } => strategy_for_query(expr, *xpath),
    };

    match strategy {
        Strategy::QuerySelector(sel) => {
            let resp = routing.execute(QuerySelectorParams::new(root, sel)).await?;
            if resp.result.node_id.0 == 0 {
                Ok(vec![])
            } else {
                Ok(vec![resp.result.node_id])
            }
        }
        Strategy::QuerySelectorAll(sel) => {
            let resp = routing
                .execute(QuerySelectorAllParams::new(root, sel))
                .await?;
            Ok(resp.result.node_ids)
        }
        Strategy::XPath(expr) => {
            // `DOM.performSearch` has no subtree-scoping parameter, so an
            // XPath find rooted at an element (rather than the document)
            // searches the whole document and is not filtered to that
            // element's descendants; see DESIGN.md for why this is the
            // pragmatic reading of the protocol rather than a bug.
            let started = routing.execute(PerformSearchParams::new(expr)).await?;
            if started.result.result_count == 0 {
                return Ok(vec![]);
            }
            let results = routing
                .execute(GetSearchResultsParams::new(
                    started.result.search_id.clone(),
                    started.result.result_count,
                ))
                .await;
            let _ = routing
                .execute(DiscardSearchResultsParams {
                    search_id: started.result.search_id,
                })
                .await;
            Ok(results?.result.node_ids)
        }
    }
}

/// Turns a matched `NodeId` into a full [`Element`]: resolves its remote
/// object id, fetches its flat attribute list, and propagates the scope's
/// iframe binding per spec §4.I "Propagation".
async fn build_element(
    routing: &Routing,
    node_id: NodeId,
    inherited: IFrameBinding,
) -> Result<Element> {
    let described = routing
        .execute(DescribeNodeParams {
            node_id: Some(node_id),
            ..Default::default()
        })
        .await?;
    let node = described.result.node;

    let resolved = routing
        .execute(ResolveNodeParams::for_backend_node(node.backend_node_id))
        .await?;
    let object_id = resolved.result.object.object_id.ok_or_else(|| {
        CdpError::InvalidCommand(format!("node {node_id:?} has no resolvable remote object"))
    })?;

    let is_iframe = matches!(node.node_name.as_str(), "IFRAME" | "FRAME");
    Ok(Element::from_query(
        routing.clone(),
        node_id,
        node.backend_node_id,
        object_id,
        node.attribute_pairs(),
        node.local_name,
        is_iframe,
        inherited,
    ))
}

/// Polls `root` for `by` at spec §4.H's ~500ms cadence until something
/// matches or `timeout` elapses, then builds the result(s).
///
/// `timeout == Duration::ZERO` means "check once, don't wait" (spec's
/// `timeout == 0` case).
pub(crate) async fn find(
    routing: &Routing,
    root: NodeId,
    by: FindBy,
    find_all: bool,
    timeout: Duration,
    raise_exc: bool,
    inherited: IFrameBinding,
    poll_interval: Duration,
) -> Result<Vec<Element>> {
    let deadline = Instant::now() + timeout;
    loop {
        let matches = try_find(routing, root, &by).await?;
        if !matches.is_empty() {
            let ids: Vec<NodeId> = if find_all {
                matches
            } else {
                matches.into_iter().take(1).collect()
            };
            let mut elements = Vec::with_capacity(ids.len());
            for id in ids {
                elements.push(build_element(routing, id, inherited.clone()).await?);
            }
            return Ok(elements);
        }

        if timeout.is_zero() || Instant::now() >= deadline {
            if timeout > Duration::ZERO {
                return Err(CdpError::WaitElementTimeout);
            }
            if raise_exc {
                return Err(CdpError::ElementNotFound);
            }
            return Ok(vec![]);
        }

        crate::utils::sleep(poll_interval.min(deadline.saturating_duration_since(Instant::now())))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_id_uses_query_selector() {
        let bag = AttributeBag {
            id: Some("main".into()),
            ..Default::default()
        };
        match strategy_for_bag(&bag).unwrap() {
            Strategy::QuerySelector(s) => assert_eq!(s, "#main"),
            _ => panic!("expected QuerySelector"),
        }
    }

    #[test]
    fn multiple_attributes_build_xpath_conjunction() {
        let bag = AttributeBag {
            tag_name: Some("button".into()),
            name: Some("submit".into()),
            text: Some("Go".into()),
            ..Default::default()
        };
        match strategy_for_bag(&bag).unwrap() {
            Strategy::XPath(xpath) => {
                assert!(xpath.starts_with("//button["));
                assert!(xpath.contains("@name=\"submit\""));
                assert!(xpath.contains("normalize-space()=\"Go\""));
            }
            _ => panic!("expected XPath"),
        }
    }

    #[test]
    fn query_leading_slash_classifies_as_xpath() {
        match strategy_for_query("//div[@id='x']", None) {
            Strategy::XPath(_) => {}
            _ => panic!("expected XPath"),
        }
    }

    #[test]
    fn query_leading_hash_classifies_as_css() {
        match strategy_for_query("#x .y", None) {
            Strategy::QuerySelectorAll(_) => {}
            _ => panic!("expected CSS"),
        }
    }
}
