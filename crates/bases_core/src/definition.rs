//! In-memory shape of a parsed base definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::path::{split_namespace, Namespace};

/// Column order used when a view declares none.
pub const DEFAULT_ORDER_PATH: &str = "file.name";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filter>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub formulas: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
    #[serde(default)]
    pub views: Vec<View>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    #[serde(default, alias = "display_name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl BaseDefinition {
    pub fn formula(&self, name: &str) -> Option<&str> {
        self.formulas.get(name).map(String::as_str)
    }

    pub fn view_named(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|view| view.name == name)
    }

    /// Header label for a property path.
    ///
    /// Lookup order: the exact path; for un-namespaced paths the `note.`
    /// form; for `note.` paths the bare form; finally the path with any known
    /// namespace prefix stripped.
    pub fn display_name(&self, path: &str) -> String {
        let lookup = |key: &str| {
            self.properties
                .get(key)
                .and_then(|p| p.display_name.as_deref())
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
        };
        if let Some(name) = lookup(path) {
            return name;
        }
        let (ns, bare) = split_namespace(path);
        let retry = match ns {
            Namespace::Bare => lookup(&format!("note.{bare}")),
            Namespace::Note => lookup(bare),
            Namespace::File | Namespace::Formula => None,
        };
        retry.unwrap_or_else(|| bare.to_string())
    }

    /// Names unnamed views `View 1`, `View 2`, ... by position.
    pub fn assign_default_view_names(&mut self) {
        for (idx, view) in self.views.iter_mut().enumerate() {
            if view.name.trim().is_empty() {
                view.name = format!("View {}", idx + 1);
            }
        }
    }
}

/// A boolean combinator node.
///
/// When more than one list is present, `and` takes precedence, then `or`,
/// then `not`. A node with none of them is vacuously true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FilterRepr")]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Vec<Condition>>,
}

impl Filter {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Filter {
            and: Some(conditions),
            ..Filter::default()
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Filter {
            or: Some(conditions),
            ..Filter::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Expression(String),
    Group(Filter),
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Expression(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterRepr {
    Expression(String),
    Node {
        #[serde(default)]
        and: Option<Vec<Condition>>,
        #[serde(default)]
        or: Option<Vec<Condition>>,
        #[serde(default)]
        not: Option<Vec<Condition>>,
    },
}

impl From<FilterRepr> for Filter {
    fn from(repr: FilterRepr) -> Self {
        match repr {
            FilterRepr::Expression(expr) => Filter::all(vec![Condition::Expression(expr)]),
            FilterRepr::Node { and, or, not } => Filter { and, or, not },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: ViewKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filter>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub sort: Vec<SortRule>,
    #[serde(default, alias = "columnSize")]
    pub column_sizes: BTreeMap<String, f64>,
    #[serde(default)]
    pub row_height: RowHeight,
    /// Unset means the renderer's configured default applies.
    #[serde(default, alias = "markers", skip_serializing_if = "Option::is_none")]
    pub marker_style: Option<MarkerStyle>,
    #[serde(default)]
    pub indent_properties: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_aspect_ratio: Option<f64>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_property: Option<String>,
    #[serde(default, alias = "separator", skip_serializing_if = "Option::is_none")]
    pub list_separator: Option<String>,
}

impl View {
    pub fn new(kind: ViewKind, name: impl Into<String>) -> Self {
        View {
            kind,
            name: name.into(),
            filters: None,
            order: Vec::new(),
            sort: Vec::new(),
            column_sizes: BTreeMap::new(),
            row_height: RowHeight::default(),
            marker_style: None,
            indent_properties: false,
            image_aspect_ratio: None,
            image_property: None,
            list_separator: None,
        }
    }

    /// Declared order, or `[file.name]` when none is declared.
    pub fn effective_order(&self) -> Vec<String> {
        if self.order.is_empty() {
            vec![DEFAULT_ORDER_PATH.to_string()]
        } else {
            self.order.clone()
        }
    }

    /// Card image aspect ratio; non-positive or missing ratios fall back to 1.
    pub fn aspect_ratio(&self) -> f64 {
        match self.image_aspect_ratio {
            Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewKind {
    #[default]
    Table,
    List,
    Cards,
    /// Kept verbatim so the renderer can name it in an error fragment.
    Other(String),
}

impl ViewKind {
    pub fn as_str(&self) -> &str {
        match self {
            ViewKind::Table => "table",
            ViewKind::List => "list",
            ViewKind::Cards => "cards",
            ViewKind::Other(kind) => kind,
        }
    }
}

impl From<String> for ViewKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => ViewKind::Table,
            "list" => ViewKind::List,
            "cards" | "card" => ViewKind::Cards,
            _ => ViewKind::Other(raw),
        }
    }
}

impl From<ViewKind> for String {
    fn from(kind: ViewKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowHeight {
    Short,
    #[default]
    Medium,
    Tall,
}

impl RowHeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowHeight::Short => "short",
            RowHeight::Medium => "medium",
            RowHeight::Tall => "tall",
        }
    }
}

impl From<String> for RowHeight {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => RowHeight::Short,
            "tall" => RowHeight::Tall,
            _ => RowHeight::Medium,
        }
    }
}

impl From<RowHeight> for String {
    fn from(height: RowHeight) -> Self {
        height.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerStyle {
    Numbered,
    #[default]
    Bulleted,
    None,
}

impl MarkerStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerStyle::Numbered => "numbered",
            MarkerStyle::Bulleted => "bulleted",
            MarkerStyle::None => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "numbered" | "number" | "ordered" => Some(MarkerStyle::Numbered),
            "bulleted" | "bullet" | "bullets" => Some(MarkerStyle::Bulleted),
            "none" => Some(MarkerStyle::None),
            _ => None,
        }
    }
}

impl From<String> for MarkerStyle {
    fn from(raw: String) -> Self {
        MarkerStyle::parse(&raw).unwrap_or_default()
    }
}

impl From<MarkerStyle> for String {
    fn from(style: MarkerStyle) -> Self {
        style.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortRule {
    pub fn ascending(property: impl Into<String>) -> Self {
        SortRule {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(property: impl Into<String>) -> Self {
        SortRule {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl From<String> for SortDirection {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => "ASC".to_string(),
            SortDirection::Descending => "DESC".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Formula sources are strings, but YAML authors write bare numbers and
/// booleans too; those are kept as their textual form.
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Scalar>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, scalar)| {
            let source = match scalar {
                Scalar::Text(s) => s,
                Scalar::Number(n) => crate::value::Value::Number(n).to_display_string(),
                Scalar::Bool(b) => b.to_string(),
            };
            (name, source)
        })
        .collect())
}
