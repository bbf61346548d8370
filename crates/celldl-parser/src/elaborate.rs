//! Structural elaboration of a CellDL document.
//!
//! The [`Builder`] walks the document in pre-order and turns elements into
//! the semantic model. Each structural level has its own set of allowed
//! children, expressed as a sum type that is matched exhaustively:
//!
//! - `cell-diagram`: [`RootChild`]
//! - `diagram` and `compartment`: [`ContainerChild`]
//! - `bond-graph`: [`BondGraphChild`](bond_graph::BondGraphChild)
//!
//! Every failure aborts the parse. The element being processed when the
//! failure occurred is attached to the diagnostic.

mod bond_graph;

use log::{debug, info};

use celldl_core::{
    identifier::Id,
    semantic::{
        Compartment, ContainerRef, Diagram, Properties, Quantity, Transporter, TransporterPosition,
    },
};

use crate::{
    css::StylesheetSet,
    diagnostics::DiagnosticsContext,
    document::{Element, ROOT_TAG},
    elaborate_utils::{IdRegistry, unexpected_element},
    error::{Diagnostic, ErrorCode, ParseError, Result},
};

/// Children allowed directly under `cell-diagram`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootChild {
    BondGraph,
    Diagram,
    /// Stylesheets are collected before elaboration starts.
    Style,
}

impl RootChild {
    fn classify(element: &Element<'_, '_>) -> Result<Self> {
        match element.tag() {
            "bond-graph" => Ok(Self::BondGraph),
            "diagram" => Ok(Self::Diagram),
            "style" => Ok(Self::Style),
            _ => Err(unexpected_element(
                element,
                ROOT_TAG,
                &["diagram", "bond-graph", "style"],
            )),
        }
    }
}

/// Children allowed under `diagram` and `compartment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerChild {
    Compartment,
    Quantity,
    /// Only valid directly inside a compartment.
    Transporter { compartment: Id },
}

impl ContainerChild {
    fn classify(element: &Element<'_, '_>, container: ContainerRef) -> Result<Self> {
        match (element.tag(), container) {
            ("compartment", _) => Ok(Self::Compartment),
            ("quantity", _) => Ok(Self::Quantity),
            ("transporter", ContainerRef::Compartment(compartment)) => {
                Ok(Self::Transporter { compartment })
            }
            ("transporter", ContainerRef::Diagram) => Err(Diagnostic::error(
                "transporter must be inside a compartment",
            )
            .with_code(ErrorCode::E202)
            .with_label(element.span(), "transporter outside a compartment")
            .with_help("move the transporter into the compartment whose boundary it crosses")),
            (_, ContainerRef::Diagram) => Err(unexpected_element(
                element,
                "diagram",
                &["compartment", "quantity"],
            )),
            (_, ContainerRef::Compartment(_)) => Err(unexpected_element(
                element,
                "compartment",
                &["compartment", "quantity", "transporter"],
            )),
        }
    }
}

/// Builds a [`Diagram`] from the elements of one document.
pub(crate) struct Builder<'a> {
    stylesheets: &'a StylesheetSet,
    diagnostics: DiagnosticsContext,
    ids: IdRegistry,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(stylesheets: &'a StylesheetSet) -> Self {
        Self {
            stylesheets,
            diagnostics: DiagnosticsContext::new(),
            ids: IdRegistry::new(),
        }
    }

    /// Build the diagram rooted at the `cell-diagram` element `root`.
    pub(crate) fn build(
        mut self,
        root: roxmltree::Node<'a, '_>,
    ) -> std::result::Result<Diagram, ParseError> {
        let root = Element::new(root, self.stylesheets);
        self.build_root(&root)
            .map_err(|diagnostic| self.diagnostics.enrich(diagnostic).into())
    }

    fn build_root(&mut self, root: &Element<'_, '_>) -> Result<Diagram> {
        self.diagnostics.record(root);

        let mut diagram_element = None;
        let mut bond_graph_element = None;
        for child in root.children() {
            self.diagnostics.record(&child);
            match RootChild::classify(&child)? {
                RootChild::Diagram => Self::set_singleton(&mut diagram_element, child)?,
                RootChild::BondGraph => Self::set_singleton(&mut bond_graph_element, child)?,
                RootChild::Style => {}
            }
        }

        let mut diagram = self.build_diagram(root, diagram_element.as_ref())?;
        if let Some(element) = &bond_graph_element {
            self.build_bond_graph(&mut diagram, element)?;
        }

        info!(
            compartments = diagram.compartments().count(),
            quantities = diagram.quantities().count(),
            transporters = diagram.transporters().count(),
            potentials = diagram.bond_graph().potentials().count(),
            flows = diagram.bond_graph().flows().count();
            "Diagram elaboration completed successfully",
        );
        Ok(diagram)
    }

    /// Keep the first `diagram` or `bond-graph` element, rejecting any later one.
    fn set_singleton<'d, 'i>(
        slot: &mut Option<Element<'d, 'i>>,
        element: Element<'d, 'i>,
    ) -> Result<()> {
        if let Some(first) = slot {
            return Err(Diagnostic::error(format!(
                "only one `{}` element is allowed",
                element.tag()
            ))
            .with_code(ErrorCode::E201)
            .with_label(element.span(), format!("second `{}`", element.tag()))
            .with_secondary_label(first.span(), "first declared here"));
        }
        *slot = Some(element);
        Ok(())
    }

    fn build_diagram(
        &mut self,
        root: &Element<'_, '_>,
        element: Option<&Element<'_, '_>>,
    ) -> Result<Diagram> {
        let Some(element) = element else {
            debug!("No diagram element, using an empty diagram");
            let properties = Properties::new(root.attributes(), root.style().clone());
            let width = self.dimension("width", &[root])?;
            let height = self.dimension("height", &[root])?;
            return Ok(Diagram::new(properties, width, height));
        };

        self.diagnostics.record(element);
        let width = self.dimension("width", &[element, root])?;
        let height = self.dimension("height", &[element, root])?;
        debug!(width:?, height:?; "Building diagram");

        let mut diagram = Diagram::new(element.properties(), width, height);
        self.build_container(&mut diagram, element, ContainerRef::Diagram)?;
        Ok(diagram)
    }

    /// Read a numeric style property from the first element declaring it, 0 if none does.
    fn dimension(&mut self, property: &str, sources: &[&Element<'_, '_>]) -> Result<f32> {
        for source in sources {
            match source.style().number(property) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) => {
                    self.diagnostics.record(source);
                    return Err(Diagnostic::error(err.to_string())
                        .with_code(ErrorCode::E103)
                        .with_label(source.span(), format!("invalid `{property}`"))
                        .with_help(format!("`{property}` must be a number, optionally in `px`")));
                }
            }
        }
        Ok(0.0)
    }

    /// Build the children of a `diagram` or `compartment` element.
    ///
    /// Transporters without an explicit position follow the previous
    /// transporter of the same compartment, so the children are folded
    /// with the last transporter as state.
    fn build_container(
        &mut self,
        diagram: &mut Diagram,
        element: &Element<'_, '_>,
        container: ContainerRef,
    ) -> Result<()> {
        element
            .children()
            .try_fold(None, |previous: Option<Id>, child| -> Result<Option<Id>> {
                self.diagnostics.record(&child);
                let properties = child.properties();
                match ContainerChild::classify(&child, container)? {
                    ContainerChild::Compartment => {
                        let id = self.ids.declare(&child, &properties)?;
                        debug!(id:% = id, container:% = container; "Built compartment");
                        diagram.add_compartment(Compartment::new(id, container, properties));
                        self.build_container(diagram, &child, ContainerRef::Compartment(id))?;
                        Ok(previous)
                    }
                    ContainerChild::Quantity => {
                        let id = self.ids.declare(&child, &properties)?;
                        debug!(id:% = id, container:% = container; "Built quantity");
                        diagram.add_quantity(Quantity::new(id, container, properties));
                        Ok(previous)
                    }
                    ContainerChild::Transporter { compartment } => {
                        let id = self.ids.declare(&child, &properties)?;
                        let position = transporter_position(&child, &properties, previous);
                        debug!(
                            id:% = id, compartment:% = compartment, position:?;
                            "Built transporter"
                        );
                        diagram.add_transporter(Transporter::new(
                            id,
                            compartment,
                            position,
                            properties,
                        ));
                        Ok(Some(id))
                    }
                }
            })
            .map(|_| ())
    }
}

/// The explicit `position` attribute or style property, else relative to `previous`.
fn transporter_position(
    element: &Element<'_, '_>,
    properties: &Properties,
    previous: Option<Id>,
) -> TransporterPosition {
    element
        .attribute("position")
        .or_else(|| properties.style().get("position"))
        .map(str::trim)
        .filter(|position| !position.is_empty())
        .map(|position| TransporterPosition::Explicit(position.to_string()))
        .or_else(|| previous.map(TransporterPosition::After))
        .unwrap_or(TransporterPosition::Unspecified)
}
