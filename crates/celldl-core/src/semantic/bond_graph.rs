//! Bond-graph entities: potentials, flows and flow components.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    identifier::Id,
    semantic::element::{ContainerRef, Properties},
};

/// A bond-graph node mirroring a quantity.
///
/// A potential always lives in the container of the quantity it mirrors.
#[derive(Debug, Clone, Serialize)]
pub struct Potential {
    id: Id,
    quantity: Id,
    container: ContainerRef,
    properties: Properties,
}

impl Potential {
    pub fn new(id: Id, quantity: Id, container: ContainerRef, properties: Properties) -> Self {
        Self {
            id,
            quantity,
            container,
            properties,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The mirrored quantity.
    pub fn quantity(&self) -> Id {
        self.quantity
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// One edge group of a flow: a single `from` potential feeding one or more `to` potentials.
#[derive(Debug, Clone, Serialize)]
pub struct FlowComponent {
    from: Id,
    to: Vec<Id>,
    container: ContainerRef,
    properties: Properties,
}

impl FlowComponent {
    pub fn new(from: Id, to: Vec<Id>, container: ContainerRef, properties: Properties) -> Self {
        Self {
            from,
            to,
            container,
            properties,
        }
    }

    pub fn from(&self) -> Id {
        self.from
    }

    pub fn to(&self) -> &[Id] {
        &self.to
    }

    /// The container resolved for the owning flow.
    pub fn container(&self) -> ContainerRef {
        self.container
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// A bond-graph flow grouping one or more components, optionally anchored to a transporter.
#[derive(Debug, Clone, Serialize)]
pub struct Flow {
    id: Id,
    transporter: Option<Id>,
    container: ContainerRef,
    components: Vec<FlowComponent>,
    properties: Properties,
}

impl Flow {
    pub fn new(
        id: Id,
        transporter: Option<Id>,
        container: ContainerRef,
        components: Vec<FlowComponent>,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            transporter,
            container,
            components,
            properties,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The anchoring transporter, if any.
    pub fn transporter(&self) -> Option<Id> {
        self.transporter
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    pub fn components(&self) -> &[FlowComponent] {
        &self.components
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// The bond graph of a diagram.
///
/// Every [`Diagram`](crate::semantic::Diagram) owns exactly one bond graph,
/// which is empty when the document has no `bond-graph` element.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BondGraph {
    properties: Properties,
    potentials: IndexMap<Id, Potential>,
    flows: IndexMap<Id, Flow>,
}

impl BondGraph {
    /// Create an empty bond graph with the properties of its `bond-graph` element.
    pub fn new(properties: Properties) -> Self {
        Self {
            properties,
            ..Self::default()
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Potentials in document order.
    pub fn potentials(&self) -> impl Iterator<Item = &Potential> {
        self.potentials.values()
    }

    /// Flows in document order.
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn potential(&self, id: Id) -> Option<&Potential> {
        self.potentials.get(&id)
    }

    pub fn flow(&self, id: Id) -> Option<&Flow> {
        self.flows.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.potentials.is_empty() && self.flows.is_empty()
    }

    pub(crate) fn insert_potential(&mut self, potential: Potential) {
        self.potentials.insert(potential.id(), potential);
    }

    pub(crate) fn insert_flow(&mut self, flow: Flow) {
        self.flows.insert(flow.id(), flow);
    }
}
