//! The root diagram type.

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::{
    identifier::Id,
    semantic::{
        bond_graph::{BondGraph, Flow, Potential},
        element::{Compartment, ContainerRef, ElementRef, Properties, Quantity, Transporter},
    },
};

/// A fully validated cell diagram.
///
/// The diagram is the root container. It owns every compartment, quantity
/// and transporter (keyed by id, in document order) and exactly one
/// [`BondGraph`]. Each container additionally records the elements
/// registered in it, which is how potentials and flow components are
/// attached to the compartment they were validated against.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagram {
    properties: Properties,
    width: f32,
    height: f32,
    children: Vec<ElementRef>,
    compartments: IndexMap<Id, Compartment>,
    quantities: IndexMap<Id, Quantity>,
    transporters: IndexMap<Id, Transporter>,
    bond_graph: BondGraph,
}

impl Diagram {
    /// Create an empty diagram with the properties of its `diagram` element and its size.
    pub fn new(properties: Properties, width: f32, height: f32) -> Self {
        Self {
            properties,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Diagram width from the `width` style property, 0 when unset.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Diagram height from the `height` style property, 0 when unset.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Elements registered directly in the diagram, in registration order.
    pub fn children(&self) -> &[ElementRef] {
        &self.children
    }

    /// Elements registered in `container`, in registration order.
    ///
    /// Unknown compartments have no children.
    pub fn container_children(&self, container: ContainerRef) -> &[ElementRef] {
        match container {
            ContainerRef::Diagram => &self.children,
            ContainerRef::Compartment(id) => self
                .compartments
                .get(&id)
                .map(Compartment::children)
                .unwrap_or_default(),
        }
    }

    pub fn compartments(&self) -> impl Iterator<Item = &Compartment> {
        self.compartments.values()
    }

    pub fn quantities(&self) -> impl Iterator<Item = &Quantity> {
        self.quantities.values()
    }

    pub fn transporters(&self) -> impl Iterator<Item = &Transporter> {
        self.transporters.values()
    }

    pub fn find_compartment(&self, id: Id) -> Option<&Compartment> {
        self.compartments.get(&id)
    }

    pub fn find_quantity(&self, id: Id) -> Option<&Quantity> {
        self.quantities.get(&id)
    }

    pub fn find_transporter(&self, id: Id) -> Option<&Transporter> {
        self.transporters.get(&id)
    }

    pub fn bond_graph(&self) -> &BondGraph {
        &self.bond_graph
    }

    /// Add a compartment and register it in its container.
    ///
    /// The containing compartment must already have been added.
    pub fn add_compartment(&mut self, compartment: Compartment) {
        let id = compartment.id();
        self.register(compartment.container(), ElementRef::Compartment { id });
        self.compartments.insert(id, compartment);
    }

    pub fn add_quantity(&mut self, quantity: Quantity) {
        let id = quantity.id();
        self.register(quantity.container(), ElementRef::Quantity { id });
        self.quantities.insert(id, quantity);
    }

    pub fn add_transporter(&mut self, transporter: Transporter) {
        let id = transporter.id();
        self.register(transporter.container(), ElementRef::Transporter { id });
        self.transporters.insert(id, transporter);
    }

    /// Replace the bond graph. Potentials and flows added afterwards go into it.
    pub fn set_bond_graph(&mut self, bond_graph: BondGraph) {
        self.bond_graph = bond_graph;
    }

    /// Add a potential to the bond graph and register it in its container.
    pub fn add_potential(&mut self, potential: Potential) {
        let id = potential.id();
        self.register(potential.container(), ElementRef::Potential { id });
        self.bond_graph.insert_potential(potential);
    }

    /// Add a flow to the bond graph and register each of its components in their container.
    pub fn add_flow(&mut self, flow: Flow) {
        let flow_id = flow.id();
        for (index, component) in flow.components().iter().enumerate() {
            self.register(
                component.container(),
                ElementRef::FlowComponent {
                    flow: flow_id,
                    index,
                },
            );
        }
        self.bond_graph.insert_flow(flow);
    }

    fn register(&mut self, container: ContainerRef, element: ElementRef) {
        match container {
            ContainerRef::Diagram => self.children.push(element),
            ContainerRef::Compartment(id) => match self.compartments.get_mut(&id) {
                Some(compartment) => compartment.register(element),
                None => warn!(
                    compartment:% = id, element:?;
                    "Element registered in unknown compartment"
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{FlowComponent, TransporterPosition};

    fn compartment(id: &str, container: ContainerRef) -> Compartment {
        Compartment::new(Id::new(id), container, Properties::default())
    }

    #[test]
    fn test_empty_diagram_has_empty_bond_graph() {
        let diagram = Diagram::new(Properties::default(), 0.0, 0.0);
        assert!(diagram.bond_graph().is_empty());
        assert!(diagram.children().is_empty());
    }

    #[test]
    fn test_registration_follows_containers() {
        let mut diagram = Diagram::new(Properties::default(), 100.0, 50.0);
        let cell = Id::new("cell");

        diagram.add_compartment(compartment("cell", ContainerRef::Diagram));
        diagram.add_compartment(compartment("nucleus", ContainerRef::Compartment(cell)));
        diagram.add_quantity(Quantity::new(
            Id::new("q1"),
            ContainerRef::Compartment(cell),
            Properties::default(),
        ));
        diagram.add_transporter(Transporter::new(
            Id::new("t1"),
            cell,
            TransporterPosition::Unspecified,
            Properties::default(),
        ));

        assert_eq!(
            diagram.children(),
            [ElementRef::Compartment { id: cell }]
        );
        assert_eq!(
            diagram.container_children(ContainerRef::Compartment(cell)),
            [
                ElementRef::Compartment {
                    id: Id::new("nucleus")
                },
                ElementRef::Quantity { id: Id::new("q1") },
                ElementRef::Transporter { id: Id::new("t1") },
            ]
        );
        assert!(
            diagram
                .container_children(ContainerRef::Compartment(Id::new("missing")))
                .is_empty()
        );
    }

    #[test]
    fn test_flow_components_registered_in_their_container() {
        let mut diagram = Diagram::new(Properties::default(), 0.0, 0.0);
        let cell = ContainerRef::Compartment(Id::new("cell"));
        diagram.add_compartment(compartment("cell", ContainerRef::Diagram));

        diagram.add_potential(Potential::new(
            Id::new("p1"),
            Id::new("q1"),
            cell,
            Properties::default(),
        ));
        diagram.add_flow(Flow::new(
            Id::new("f1"),
            None,
            cell,
            vec![FlowComponent::new(
                Id::new("p1"),
                vec![Id::new("p1")],
                cell,
                Properties::default(),
            )],
            Properties::default(),
        ));

        assert_eq!(
            diagram.container_children(cell),
            [
                ElementRef::Potential { id: Id::new("p1") },
                ElementRef::FlowComponent {
                    flow: Id::new("f1"),
                    index: 0
                },
            ]
        );
        assert!(diagram.bond_graph().flow(Id::new("f1")).is_some());
    }
}
