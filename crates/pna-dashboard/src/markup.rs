//! Markup tree
//!
//! A [`Node`] is one browser component: `{type, namespace, props}` with its
//! children folded into `props.children`. The helpers here build the recurring
//! arrangements (floated rows and lines, radio groups, buttons, hidden data
//! holders, data tables). [`Node::collect_layout`] turns a tree into the
//! [`Layout`] the callback graph validates against.

use pna_data::Table;
use pna_reactive::Layout;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Namespace of plain HTML elements
pub const HTML: &str = "dash_html_components";
/// Namespace of interactive core components
pub const CORE: &str = "dash_core_components";
/// Namespace of the data table
pub const TABLE: &str = "dash_table";

/// Inline style map
///
/// Only the keys the page uses; unset keys are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// CSS `display`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// CSS `float`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float: Option<String>,
    /// CSS `clear`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear: Option<String>,
    /// CSS `width`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// CSS `margin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    /// CSS `height`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl Style {
    /// Empty style
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `display: none`
    #[must_use]
    pub fn hidden() -> Self {
        Self::new().display("none")
    }

    /// Floated left with the given `clear`
    #[must_use]
    pub fn floated(clear: &str) -> Self {
        Self::new().float("left").clear(clear)
    }

    /// Set `display`
    #[must_use]
    pub fn display(mut self, v: &str) -> Self {
        self.display = Some(v.to_string());
        self
    }

    /// Show (`display: block`) or hide (`display: none`)
    #[must_use]
    pub fn visible(self, visible: bool) -> Self {
        self.display(if visible { "block" } else { "none" })
    }

    /// Set `float`
    #[must_use]
    pub fn float(mut self, v: &str) -> Self {
        self.float = Some(v.to_string());
        self
    }

    /// Set `clear`
    #[must_use]
    pub fn clear(mut self, v: &str) -> Self {
        self.clear = Some(v.to_string());
        self
    }

    /// Set `width`
    #[must_use]
    pub fn width(mut self, v: &str) -> Self {
        self.width = Some(v.to_string());
        self
    }

    /// Set `margin`
    #[must_use]
    pub fn margin(mut self, v: &str) -> Self {
        self.margin = Some(v.to_string());
        self
    }

    /// Set `height`
    #[must_use]
    pub fn height(mut self, v: &str) -> Self {
        self.height = Some(v.to_string());
        self
    }

    /// As a property value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A child of a node
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Nested component
    Node(Node),
    /// Plain text
    Text(String),
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One component of the markup tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: String,
    namespace: String,
    props: Map<String, Value>,
    children: Vec<Child>,
}

impl Node {
    fn new(namespace: &str, kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    /// HTML element (`Div`, `Span`, `H2`, `Button`, ...)
    ///
    /// Starts with empty `children` and `null` `style` so both can be
    /// callback targets.
    #[must_use]
    pub fn html(kind: &str) -> Self {
        Self::new(HTML, kind)
            .prop("children", Value::Array(Vec::new()))
            .prop("style", Value::Null)
    }

    /// Core component (`Graph`, `Input`, `Dropdown`, ...)
    #[must_use]
    pub fn core(kind: &str) -> Self {
        Self::new(CORE, kind)
    }

    /// `div`
    #[must_use]
    pub fn div() -> Self {
        Self::html("Div")
    }

    /// `span` holding text
    #[must_use]
    pub fn span(text: &str) -> Self {
        Self::html("Span").child(text)
    }

    /// Heading (`level` 1-6)
    #[must_use]
    pub fn heading(level: u8, text: &str, style: Style) -> Self {
        Self::html(&format!("H{level}")).child(text).style(style)
    }

    /// Text input with empty value, enabled
    #[must_use]
    pub fn text_input(id: &str) -> Self {
        Self::core("Input")
            .id(id)
            .prop("type", "text")
            .prop("value", Value::Null)
            .prop("disabled", false)
    }

    /// Plot holding an empty figure
    #[must_use]
    pub fn graph(id: &str) -> Self {
        Self::core("Graph")
            .id(id)
            .prop("figure", crate::figure::Figure::empty().to_value())
    }

    /// Set the component id
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.prop("id", id)
    }

    /// Set a property
    #[must_use]
    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Set the style
    #[must_use]
    pub fn style(self, style: Style) -> Self {
        self.prop("style", style.to_value())
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children
    #[must_use]
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Component id, if set and non-empty
    #[must_use]
    pub fn component_id(&self) -> Option<&str> {
        self.props
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Component type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Property value, with children folded in
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.props_value().remove(name)
    }

    /// Properties with children folded into `children`
    fn props_value(&self) -> Map<String, Value> {
        let mut props = self.props.clone();
        if !self.children.is_empty() {
            let children = self
                .children
                .iter()
                .map(|c| match c {
                    Child::Node(n) => n.to_value(),
                    Child::Text(t) => Value::String(t.clone()),
                })
                .collect();
            props.insert("children".into(), Value::Array(children));
        }
        props
    }

    /// Wire form
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.kind,
            "namespace": self.namespace,
            "props": self.props_value(),
        })
    }

    /// Find a descendant (or this node) by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.component_id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| match c {
            Child::Node(n) => n.find(id),
            Child::Text(_) => None,
        })
    }

    /// Declare every node with an id, with its initial properties
    pub fn collect_layout(&self, layout: &mut Layout) {
        if let Some(id) = self.component_id() {
            layout.declare(id, self.props_value());
        }
        for child in &self.children {
            if let Child::Node(n) = child {
                n.collect_layout(layout);
            }
        }
    }

    /// Layout of the whole tree
    #[must_use]
    pub fn to_layout(&self) -> Layout {
        let mut layout = Layout::new();
        self.collect_layout(&mut layout);
        layout
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Options for [`in_a_row`] and [`in_a_line`]
#[derive(Debug, Clone)]
pub struct Arrangement {
    /// Id of the wrapping div
    pub id: Option<String>,
    /// Margin around every item
    pub margin: String,
    /// Width of every item
    pub width: Option<String>,
    /// Style of the wrapping div
    pub style: Option<Style>,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self {
            id: None,
            margin: "2%".into(),
            width: None,
            style: None,
        }
    }
}

impl Arrangement {
    /// Wrapping div id
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Item width
    #[must_use]
    pub fn width(mut self, width: &str) -> Self {
        self.width = Some(width.to_string());
        self
    }

    /// Wrapping div style
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    fn wrap(&self, items: Vec<Node>, clear: &str) -> Node {
        let wrappers = items.into_iter().map(|item| {
            let mut style = Style::floated(clear).margin(&self.margin);
            if let Some(width) = &self.width {
                style = style.width(width);
            }
            Node::div().style(style).child(item)
        });
        let mut outer = Node::div().children(wrappers);
        if let Some(id) = &self.id {
            outer = outer.id(id);
        }
        if let Some(style) = &self.style {
            outer = outer.style(style.clone());
        }
        outer
    }
}

/// Items floated side by side
#[must_use]
pub fn in_a_row(items: Vec<Node>, arrangement: &Arrangement) -> Node {
    arrangement.wrap(items, "none")
}

/// Items stacked, each on its own line
#[must_use]
pub fn in_a_line(items: Vec<Node>, arrangement: &Arrangement) -> Node {
    arrangement.wrap(items, "both")
}

/// Labelled radio group
#[must_use]
pub fn radio(label: &str, id: &str, options: &[&str], selection: Option<&str>) -> Node {
    let options: Vec<Value> = options
        .iter()
        .map(|o| json!({"label": o, "value": o}))
        .collect();
    let control = Node::core("RadioItems")
        .id(id)
        .prop("options", options)
        .prop("value", selection.map_or(Value::Null, Value::from));
    in_a_row(
        vec![Node::span(label), control],
        &Arrangement::default().style(Style::floated("both")),
    )
}

/// Button with a zero click count; floated left unless `style` is given
#[must_use]
pub fn button(id: &str, label: &str, style: Option<Style>) -> Node {
    Node::html("Button")
        .id(id)
        .prop("n_clicks", 0)
        .child(label)
        .style(style.unwrap_or_else(|| Style::floated("none")))
}

/// Invisible div used to hold data between callbacks
#[must_use]
pub fn hidden_div(id: &str, children: Value) -> Node {
    Node::div()
        .id(id)
        .prop("children", children)
        .style(Style::hidden())
}

/// Sortable, paged data table with CSV export
///
/// `columns` picks and orders the displayed columns; `None` shows all.
#[must_use]
pub fn data_table(table: &Table, columns: Option<&[&str]>, id: &str, page_size: usize) -> Node {
    let names: Vec<String> = match columns {
        Some(cols) => cols.iter().map(|c| (*c).to_string()).collect(),
        None => table.columns().to_vec(),
    };
    let columns: Vec<Value> = names
        .iter()
        .map(|n| json!({"name": n, "id": n}))
        .collect();
    let records: Vec<Value> = table.records().into_iter().map(Value::Object).collect();

    let mut node = Node::new(TABLE, "DataTable")
        .prop("columns", columns)
        .prop("data", records)
        .prop("sort_action", "native")
        .prop("sort_mode", "native")
        .prop("style_cell", json!({"whiteSpace": "normal", "height": "auto"}))
        .prop("editable", false)
        .prop("row_selectable", false)
        .prop("row_deletable", false)
        .prop("page_size", page_size)
        .prop("export_format", "csv");
    if !id.is_empty() {
        node = node.id(id);
    }
    node
}
