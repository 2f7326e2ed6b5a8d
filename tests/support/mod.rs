//! In-memory page used to drive the form loop without a browser.
//!
//! Understands the selector subset the crate emits: tag names, comma lists
//! and `[attr="value"]` filters.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use agentic_form::catalog::{Field, FieldType, FieldValue};
use agentic_form::synth::{RuleSynthesizer, ValueSynthesizer};
use agentic_form::{Error, FormDriver, FormElement, Result};

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    /// `(label, selected)` for select elements.
    pub options: Vec<(String, bool)>,
    pub checked: bool,
    pub value: String,
    pub clicks: usize,
    /// Only present in the DOM while this checkbox id is checked.
    pub revealed_by: Option<String>,
    /// Number of upcoming interactions that fail with `ElementNotFound`.
    pub failures_left: usize,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn form(id: Option<&str>) -> Self {
        let node = Self::new("form");
        match id {
            Some(id) => node.attr("id", id),
            None => node,
        }
    }

    pub fn input(id: &str, ty: &str) -> Self {
        Self::new("input").attr("id", id).attr("type", ty)
    }

    pub fn textarea(id: &str) -> Self {
        Self::new("textarea").attr("id", id)
    }

    pub fn select(id: &str, options: &[&str]) -> Self {
        let mut node = Self::new("select").attr("id", id);
        node.options = options.iter().map(|o| (o.to_string(), false)).collect();
        node
    }

    pub fn radio(id: &str, name: &str, value: &str) -> Self {
        Self::input(id, "radio").attr("name", name).attr("value", value)
    }

    pub fn submit_button() -> Self {
        Self::new("button").attr("type", "submit")
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn multiple(self) -> Self {
        self.attr("multiple", "")
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn revealed_by(mut self, checkbox_id: &str) -> Self {
        self.revealed_by = Some(checkbox_id.to_string());
        self
    }

    pub fn failing(mut self, times: usize) -> Self {
        self.failures_left = times;
        self
    }

    fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct Dom {
    nodes: Vec<FakeNode>,
    submissions: usize,
    navigations: Vec<String>,
    fail_navigation: bool,
    fail_queries: bool,
}

impl Dom {
    fn visible(&self, index: usize) -> bool {
        match &self.nodes[index].revealed_by {
            None => true,
            Some(id) => self
                .nodes
                .iter()
                .any(|n| n.id() == Some(id.as_str()) && n.checked),
        }
    }

    fn query(&self, selector: &str) -> Result<Vec<usize>> {
        let compounds = selector
            .split(',')
            .map(|c| parse_compound(c.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.nodes.len())
            .filter(|&i| self.visible(i))
            .filter(|&i| compounds.iter().any(|c| c.matches(&self.nodes[i])))
            .collect())
    }
}

struct Compound {
    tag: Option<String>,
    attrs: Vec<(String, String)>,
}

impl Compound {
    fn matches(&self, node: &FakeNode) -> bool {
        self.tag.as_deref().map_or(true, |t| t == node.tag)
            && self
                .attrs
                .iter()
                .all(|(k, v)| node.attrs.get(k).is_some_and(|actual| actual == v))
    }
}

fn parse_compound(selector: &str) -> Result<Compound> {
    let unsupported = || Error::JsError(format!("unsupported selector: {selector}"));
    let tag_end = selector.find('[').unwrap_or(selector.len());
    let tag = &selector[..tag_end];
    let mut rest = selector[tag_end..].chars().peekable();
    let mut attrs = Vec::new();

    while let Some(c) = rest.next() {
        if c != '[' {
            return Err(unsupported());
        }
        let key: String = rest.by_ref().take_while(|&c| c != '=').collect();
        if rest.next() != Some('"') {
            return Err(unsupported());
        }
        let mut value = String::new();
        loop {
            match rest.next().ok_or_else(unsupported)? {
                '\\' => value.push(rest.next().ok_or_else(unsupported)?),
                '"' => break,
                c => value.push(c),
            }
        }
        if rest.next() != Some(']') {
            return Err(unsupported());
        }
        attrs.push((key, value));
    }

    Ok(Compound {
        tag: (!tag.is_empty()).then(|| tag.to_string()),
        attrs,
    })
}

/// Shared handle to an in-memory DOM.
#[derive(Clone, Default)]
pub struct FakePage {
    dom: Arc<Mutex<Dom>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<form id="myForm">` with a submit button already in place.
    pub fn with_form() -> Self {
        let page = Self::new();
        page.add(FakeNode::form(Some("myForm")));
        page.add(FakeNode::submit_button());
        page
    }

    fn dom(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap()
    }

    pub fn add(&self, node: FakeNode) -> &Self {
        self.dom().nodes.push(node);
        self
    }

    /// Adds `<label for=id>` followed by the node.
    pub fn add_labeled(&self, label: &str, node: FakeNode) -> &Self {
        let id = node.id().unwrap_or_default().to_string();
        let mut label_node = FakeNode::new("label").attr("for", &id);
        label_node.text = label.to_string();
        self.add(label_node);
        self.add(node)
    }

    pub fn node(&self, id: &str) -> FakeNode {
        self.dom()
            .nodes
            .iter()
            .find(|n| n.id() == Some(id))
            .cloned()
            .unwrap_or_else(|| panic!("no node with id {id}"))
    }

    pub fn submissions(&self) -> usize {
        self.dom().submissions
    }

    pub fn navigations(&self) -> Vec<String> {
        self.dom().navigations.clone()
    }

    pub fn fail_navigation(&self) {
        self.dom().fail_navigation = true;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.dom().fail_queries = fail;
    }

    fn element(&self, index: usize) -> FakeElement {
        FakeElement {
            dom: Arc::clone(&self.dom),
            index,
        }
    }
}

#[async_trait]
impl FormDriver for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut dom = self.dom();
        if dom.fail_navigation {
            return Err(Error::NavigationError(format!("cannot reach {url}")));
        }
        dom.navigations.push(url.to_string());
        Ok(())
    }

    async fn find_one(&self, selector: &str) -> Result<FakeElement> {
        let first = self.dom().query(selector)?.first().copied();
        first
            .map(|i| self.element(i))
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        let found = self.dom().query(selector)?;
        Ok(found.into_iter().map(|i| self.element(i)).collect())
    }
}

pub struct FakeElement {
    dom: Arc<Mutex<Dom>>,
    index: usize,
}

impl FakeElement {
    fn read<T>(&self, f: impl FnOnce(&FakeNode) -> T) -> Result<T> {
        let dom = self.dom.lock().unwrap();
        if !dom.visible(self.index) {
            return Err(Error::StaleElement("element left the page".into()));
        }
        Ok(f(&dom.nodes[self.index]))
    }

    /// Run a page-mutating action, honouring scripted failures.
    fn act<T>(&self, f: impl FnOnce(&mut Dom, usize) -> Result<T>) -> Result<T> {
        let mut dom = self.dom.lock().unwrap();
        if !dom.visible(self.index) {
            return Err(Error::StaleElement("element left the page".into()));
        }
        let node = &mut dom.nodes[self.index];
        if node.failures_left > 0 {
            node.failures_left -= 1;
            return Err(Error::ElementNotFound(format!(
                "element {:?} is not interactable",
                node.id()
            )));
        }
        f(&mut dom, self.index)
    }
}

#[async_trait]
impl FormElement for FakeElement {
    async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.read(|n| n.attrs.get(name).cloned())
    }

    async fn tag_name(&self) -> Result<String> {
        self.read(|n| n.tag.clone())
    }

    async fn text(&self) -> Result<String> {
        self.read(|n| n.text.clone())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let dom = self.dom.lock().unwrap();
        if dom.fail_queries {
            return Err(Error::StaleElement("form was replaced".into()));
        }
        let found = dom.query(selector)?;
        Ok(found
            .into_iter()
            .filter(|&i| i != self.index)
            .map(|index| FakeElement {
                dom: Arc::clone(&self.dom),
                index,
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.act(|dom, i| {
            dom.nodes[i].value.clear();
            Ok(())
        })
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.act(|dom, i| {
            dom.nodes[i].value.push_str(text);
            Ok(())
        })
    }

    async fn click(&self) -> Result<()> {
        self.act(|dom, i| {
            dom.nodes[i].clicks += 1;
            let tag = dom.nodes[i].tag.clone();
            let ty = dom.nodes[i].attrs.get("type").cloned().unwrap_or_default();
            match (tag.as_str(), ty.as_str()) {
                ("input", "checkbox") => dom.nodes[i].checked = !dom.nodes[i].checked,
                ("input", "radio") => {
                    let name = dom.nodes[i].attrs.get("name").cloned();
                    for node in dom.nodes.iter_mut() {
                        if node.attrs.get("type").map(String::as_str) == Some("radio")
                            && node.attrs.get("name") == name.as_ref()
                        {
                            node.checked = false;
                        }
                    }
                    dom.nodes[i].checked = true;
                }
                ("button", "submit") | ("input", "submit") => dom.submissions += 1,
                _ => {}
            }
            Ok(())
        })
    }

    async fn is_selected(&self) -> Result<bool> {
        self.read(|n| n.checked)
    }

    async fn set_file(&self, path: &str) -> Result<()> {
        self.act(|dom, i| {
            dom.nodes[i].value = path.to_string();
            Ok(())
        })
    }

    async fn options(&self) -> Result<Vec<String>> {
        self.read(|n| n.options.iter().map(|(label, _)| label.clone()).collect())
    }

    async fn select_by_visible_text(&self, label: &str) -> Result<()> {
        self.act(|dom, i| {
            let node = &mut dom.nodes[i];
            let multiple = node.attrs.contains_key("multiple");
            let pos = node
                .options
                .iter()
                .position(|(l, _)| l == label)
                .ok_or_else(|| Error::ElementNotFound(format!("option '{label}'")))?;
            for (j, option) in node.options.iter_mut().enumerate() {
                if j == pos {
                    option.1 = true;
                } else if !multiple {
                    option.1 = false;
                }
            }
            Ok(())
        })
    }

    async fn deselect_all(&self) -> Result<()> {
        self.act(|dom, i| {
            for option in dom.nodes[i].options.iter_mut() {
                option.1 = false;
            }
            Ok(())
        })
    }
}

/// Labels of the currently selected options of a select node.
pub fn selected(node: &FakeNode) -> Vec<String> {
    node.options
        .iter()
        .filter(|(_, on)| *on)
        .map(|(label, _)| label.clone())
        .collect()
}

/// Rule synthesis, except checkboxes are always ticked.
pub struct TickEverything(pub RuleSynthesizer);

#[async_trait]
impl ValueSynthesizer for TickEverything {
    async fn synthesize(&self, field: &Field) -> FieldValue {
        match field.r#type {
            FieldType::Checkbox => FieldValue::Flag(true),
            _ => self.0.generate(field),
        }
    }
}
