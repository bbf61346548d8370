//! Diagram element types for the semantic model.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{identifier::Id, style::Style};

/// The container an element is registered in.
///
/// Quantities, compartments, potentials and flow components all live in
/// exactly one container: either the diagram itself or a compartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContainerRef {
    Diagram,
    Compartment(Id),
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Diagram => write!(f, "the diagram"),
            ContainerRef::Compartment(id) => write!(f, "compartment `{id}`"),
        }
    }
}

/// A reference to an element registered in a container.
///
/// Containers record their contents in registration order. Flow components
/// have no required identity of their own, so they are addressed by their
/// flow and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementRef {
    Compartment { id: Id },
    Quantity { id: Id },
    Transporter { id: Id },
    Potential { id: Id },
    FlowComponent { flow: Id, index: usize },
}

/// Raw attributes and resolved style of a document element.
///
/// `name` defaults to the id and `label` defaults to the name, so every
/// element has something to display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Properties {
    id: Option<Id>,
    name: String,
    label: String,
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
    style: Style,
}

impl Properties {
    /// Build properties from the element's attributes (in document order) and its resolved style.
    ///
    /// # Examples
    ///
    /// ```
    /// use celldl_core::{semantic::Properties, style::Style};
    ///
    /// let attributes = [("id", "q1"), ("class", "ion  sodium")]
    ///     .into_iter()
    ///     .map(|(k, v)| (k.to_string(), v.to_string()))
    ///     .collect();
    /// let properties = Properties::new(attributes, Style::new());
    ///
    /// assert_eq!(properties.name(), "q1");
    /// assert_eq!(properties.label(), "q1");
    /// assert!(properties.has_class("sodium"));
    /// ```
    pub fn new(attributes: IndexMap<String, String>, style: Style) -> Self {
        let id = attributes
            .get("id")
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(Id::new);
        let name = attributes
            .get("name")
            .cloned()
            .or_else(|| id.map(|id| id.to_string()))
            .unwrap_or_default();
        let label = attributes.get("label").cloned().unwrap_or_else(|| name.clone());
        let classes = attributes
            .get("class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            id,
            name,
            label,
            classes,
            attributes,
            style,
        }
    }

    /// The `id` attribute, if present and non-empty.
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// All raw attributes in document order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The resolved style of the element.
    pub fn style(&self) -> &Style {
        &self.style
    }
}

/// A named container that may nest compartments, quantities and transporters.
#[derive(Debug, Clone, Serialize)]
pub struct Compartment {
    id: Id,
    container: ContainerRef,
    properties: Properties,
    children: Vec<ElementRef>,
}

impl Compartment {
    /// Create an empty compartment inside `container`.
    pub fn new(id: Id, container: ContainerRef, properties: Properties) -> Self {
        Self {
            id,
            container,
            properties,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The container this compartment is nested in.
    pub fn container(&self) -> ContainerRef {
        self.container
    }

    /// This compartment viewed as a container of other elements.
    pub fn as_container(&self) -> ContainerRef {
        ContainerRef::Compartment(self.id)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Everything registered in this compartment, in registration order.
    pub fn children(&self) -> &[ElementRef] {
        &self.children
    }

    pub(crate) fn register(&mut self, element: ElementRef) {
        self.children.push(element);
    }
}

/// A measurable variable owned by exactly one container.
#[derive(Debug, Clone, Serialize)]
pub struct Quantity {
    id: Id,
    container: ContainerRef,
    properties: Properties,
}

impl Quantity {
    pub fn new(id: Id, container: ContainerRef, properties: Properties) -> Self {
        Self {
            id,
            container,
            properties,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// How a transporter is placed on its compartment boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TransporterPosition {
    /// An explicit position such as `left 10%`, kept verbatim for the layout phase.
    Explicit(String),
    /// Positioned relative to the previously added transporter of the same compartment.
    After(Id),
    /// No explicit position and no earlier transporter to follow.
    Unspecified,
}

/// A boundary-crossing element owned by a compartment.
#[derive(Debug, Clone, Serialize)]
pub struct Transporter {
    id: Id,
    compartment: Id,
    position: TransporterPosition,
    properties: Properties,
}

impl Transporter {
    pub fn new(
        id: Id,
        compartment: Id,
        position: TransporterPosition,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            compartment,
            position,
            properties,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The owning compartment.
    pub fn compartment(&self) -> Id {
        self.compartment
    }

    /// The owning compartment as a container reference.
    pub fn container(&self) -> ContainerRef {
        ContainerRef::Compartment(self.compartment)
    }

    pub fn position(&self) -> &TransporterPosition {
        &self.position
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}
