//! Elaboration of the `bond-graph` element.
//!
//! Potentials mirror quantities and live in their quantity's container.
//! Flows connect potentials through components; a flow anchored to a
//! transporter takes the transporter's container, otherwise every potential
//! it touches must share the container of its first `from` potential.

use std::iter;

use log::debug;

use celldl_core::{
    identifier::Id,
    semantic::{BondGraph, ContainerRef, Diagram, Flow, FlowComponent, Potential, Transporter},
};

use crate::{
    document::Element,
    elaborate::Builder,
    elaborate_utils::{reference_id, reference_list, unexpected_element},
    error::{Diagnostic, ErrorCode, Result},
};

/// Children allowed under `bond-graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BondGraphChild {
    Potential,
    Flow,
}

impl BondGraphChild {
    fn classify(element: &Element<'_, '_>) -> Result<Self> {
        match element.tag() {
            "potential" => Ok(Self::Potential),
            "flow" => Ok(Self::Flow),
            _ => Err(unexpected_element(
                element,
                "bond-graph",
                &["potential", "flow"],
            )),
        }
    }
}

/// Children allowed under `flow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowChild {
    Component,
}

impl FlowChild {
    fn classify(element: &Element<'_, '_>) -> Result<Self> {
        match element.tag() {
            "component" => Ok(Self::Component),
            _ => Err(unexpected_element(element, "flow", &["component"])),
        }
    }
}

/// How the container of a flow has been determined so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowContainer {
    /// No component seen yet.
    Undetermined,
    /// Fixed by the flow's transporter; components are not checked.
    Anchored(ContainerRef),
    /// Fixed by the first `from` potential.
    Inferred {
        container: ContainerRef,
        potential: Id,
    },
}

impl FlowContainer {
    /// Check the potentials of one component against the flow container.
    fn check(
        &mut self,
        builder: &Builder<'_>,
        flow: Id,
        component: &Element<'_, '_>,
        from: &Potential,
        to: &[&Potential],
    ) -> Result<()> {
        let current = *self;
        let (container, anchor) = match current {
            Self::Anchored(_) => return Ok(()),
            Self::Undetermined => {
                *self = Self::Inferred {
                    container: from.container(),
                    potential: from.id(),
                };
                (from.container(), from.id())
            }
            Self::Inferred {
                container,
                potential,
            } => (container, potential),
        };

        let Some(mismatch) = iter::once(from)
            .chain(to.iter().copied())
            .find(|potential| potential.container() != container)
        else {
            return Ok(());
        };

        let mut diagnostic = Diagnostic::error(format!(
            "flow `{flow}` spans more than one container: \
             potential `{anchor}` is in {container} but potential `{}` is in {}",
            mismatch.id(),
            mismatch.container()
        ))
        .with_code(ErrorCode::E400)
        .with_label(
            component.span(),
            format!("potential `{}` is in {}", mismatch.id(), mismatch.container()),
        );
        if let Some(span) = builder.ids.span(anchor) {
            diagnostic = diagnostic.with_secondary_label(
                span,
                format!("potential `{anchor}` is in {container}"),
            );
        }
        Err(diagnostic.with_help(
            "all potentials of a flow without a transporter must share a container; \
             anchor the flow to a transporter to connect containers",
        ))
    }

    /// The resolved container, if any component or transporter determined it.
    fn resolved(self) -> Option<ContainerRef> {
        match self {
            Self::Undetermined => None,
            Self::Anchored(container) | Self::Inferred { container, .. } => Some(container),
        }
    }
}

impl Builder<'_> {
    pub(super) fn build_bond_graph(
        &mut self,
        diagram: &mut Diagram,
        element: &Element<'_, '_>,
    ) -> Result<()> {
        self.diagnostics.record(element);
        diagram.set_bond_graph(BondGraph::new(element.properties()));

        for child in element.children() {
            self.diagnostics.record(&child);
            match BondGraphChild::classify(&child)? {
                BondGraphChild::Potential => {
                    let potential = self.build_potential(diagram, &child)?;
                    debug!(
                        id:% = potential.id(), container:% = potential.container();
                        "Built potential"
                    );
                    diagram.add_potential(potential);
                }
                BondGraphChild::Flow => {
                    let flow = self.build_flow(diagram, &child)?;
                    debug!(
                        id:% = flow.id(),
                        container:% = flow.container(),
                        components = flow.components().len();
                        "Built flow",
                    );
                    diagram.add_flow(flow);
                }
            }
        }
        Ok(())
    }

    fn build_potential(
        &mut self,
        diagram: &Diagram,
        element: &Element<'_, '_>,
    ) -> Result<Potential> {
        let properties = element.properties();
        let id = self.ids.declare(element, &properties)?;

        let Some(reference) = element.attribute("quantity") else {
            return Err(
                Diagnostic::error(format!("potential `{id}` has no `quantity`"))
                    .with_code(ErrorCode::E300)
                    .with_label(element.span(), "missing `quantity` attribute")
                    .with_help("a potential must reference the quantity it mirrors"),
            );
        };
        let quantity = reference_id(reference)
            .and_then(|quantity| diagram.find_quantity(quantity))
            .ok_or_else(|| {
                Diagnostic::error(format!(
                    "quantity `{}` of potential `{id}` not found",
                    reference.trim().trim_start_matches('#')
                ))
                .with_code(ErrorCode::E300)
                .with_label(element.span(), "unresolved quantity")
                .with_help("declare the quantity in the diagram")
            })?;

        Ok(Potential::new(
            id,
            quantity.id(),
            quantity.container(),
            properties,
        ))
    }

    fn build_flow(&mut self, diagram: &Diagram, element: &Element<'_, '_>) -> Result<Flow> {
        let properties = element.properties();
        let id = self.ids.declare(element, &properties)?;

        let transporter = element
            .attribute("transporter")
            .map(|reference| Self::resolve_transporter(diagram, element, reference))
            .transpose()?;
        let mut container = match transporter {
            Some(transporter) => FlowContainer::Anchored(transporter.container()),
            None => FlowContainer::Undetermined,
        };

        let mut components = Vec::new();
        for child in element.children() {
            self.diagnostics.record(&child);
            match FlowChild::classify(&child)? {
                FlowChild::Component => {
                    let from = Self::component_attribute(&child, id, "from")?;
                    let to = Self::component_attribute(&child, id, "to")?;

                    let from = Self::resolve_potential(diagram, &child, from)?;
                    let to = reference_list(to)
                        .into_iter()
                        .map(|reference| Self::resolve_potential(diagram, &child, reference))
                        .collect::<Result<Vec<_>>>()?;
                    container.check(self, id, &child, from, &to)?;

                    components.push((
                        from.id(),
                        to.iter().map(|potential| potential.id()).collect::<Vec<_>>(),
                        child.properties(),
                    ));
                }
            }
        }

        self.diagnostics.record(element);
        let (false, Some(container)) = (components.is_empty(), container.resolved()) else {
            return Err(Diagnostic::error(format!("flow `{id}` has no components"))
                .with_code(ErrorCode::E205)
                .with_label(element.span(), "empty flow")
                .with_help("add at least one `<component from=\"...\" to=\"...\"/>`"));
        };

        let components = components
            .into_iter()
            .map(|(from, to, properties)| FlowComponent::new(from, to, container, properties))
            .collect();
        Ok(Flow::new(
            id,
            transporter.map(Transporter::id),
            container,
            components,
            properties,
        ))
    }

    /// A required, non-blank `from` or `to` attribute of a flow component.
    fn component_attribute<'e>(
        element: &Element<'e, '_>,
        flow: Id,
        name: &str,
    ) -> Result<&'e str> {
        element
            .attribute(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Diagnostic::error(format!("component of flow `{flow}` has no `{name}` potential"))
                    .with_code(ErrorCode::E301)
                    .with_label(element.span(), format!("missing `{name}` attribute"))
                    .with_help("flow components require both `from` and `to` potentials")
            })
    }

    fn resolve_potential<'d>(
        diagram: &'d Diagram,
        element: &Element<'_, '_>,
        reference: &str,
    ) -> Result<&'d Potential> {
        reference_id(reference)
            .and_then(|id| diagram.bond_graph().potential(id))
            .ok_or_else(|| {
                Diagnostic::error(format!("unknown potential `{}`", reference.trim()))
                    .with_code(ErrorCode::E302)
                    .with_label(element.span(), "unresolved potential")
                    .with_help("potentials must be declared before the flows that use them")
            })
    }

    fn resolve_transporter<'d>(
        diagram: &'d Diagram,
        element: &Element<'_, '_>,
        reference: &str,
    ) -> Result<&'d Transporter> {
        reference_id(reference)
            .and_then(|id| diagram.find_transporter(id))
            .ok_or_else(|| {
                Diagnostic::error(format!("unknown transporter `{}`", reference.trim()))
                    .with_code(ErrorCode::E303)
                    .with_label(element.span(), "unresolved transporter")
                    .with_help("declare the transporter inside a compartment of the diagram")
            })
    }
}
