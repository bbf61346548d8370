//! CellDL Core Types and Definitions
//!
//! This crate provides the semantic model produced by parsing a CellDL
//! document. It includes:
//!
//! - **Identifiers**: Efficient string-interned element identifiers ([`identifier::Id`])
//! - **Colours**: Colour handling with CSS colour support ([`color::Color`])
//! - **Styles**: Resolved style declarations attached to every element ([`style::Style`])
//! - **Semantic**: Diagram and bond-graph entities ([`semantic`] module)

pub mod color;
pub mod identifier;
pub mod semantic;
pub mod style;
