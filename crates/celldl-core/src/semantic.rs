//! Semantic model types for CellDL diagrams.
//!
//! This module contains the fully validated, styled entities produced by the
//! parser:
//!
//! - [`Diagram`] - The root container owning compartments, quantities,
//!   transporters and exactly one [`BondGraph`]
//! - [`Compartment`], [`Quantity`], [`Transporter`] - The containment hierarchy
//! - [`Potential`], [`Flow`], [`FlowComponent`] - Bond-graph nodes and edges
//! - [`Properties`] - Attributes and resolved style shared by every entity

mod bond_graph;
mod diagram;
mod element;

pub use bond_graph::{BondGraph, Flow, FlowComponent, Potential};
pub use diagram::Diagram;
pub use element::{
    Compartment, ContainerRef, ElementRef, Properties, Quantity, Transporter,
    TransporterPosition,
};
