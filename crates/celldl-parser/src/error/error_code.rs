//! Error codes for the CellDL diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Document errors
//! - `E1xx` - Stylesheet errors
//! - `E2xx` - Structural errors
//! - `E3xx` - Reference errors
//! - `E4xx` - Container consistency errors

use std::fmt;

/// The broad category an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input is not a well-formed CellDL document.
    Document,
    /// A selector or rule block could not be parsed.
    Selector,
    /// A stylesheet could not be loaded or one of its values is unusable.
    Stylesheet,
    /// An element appears where it is not allowed, or is missing identity.
    Structural,
    /// A reference to another element does not resolve.
    Reference,
    /// A flow spans more than one container.
    ContainerConsistency,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Document => "document error",
            ErrorKind::Selector => "selector error",
            ErrorKind::Stylesheet => "stylesheet error",
            ErrorKind::Structural => "structural error",
            ErrorKind::Reference => "reference error",
            ErrorKind::ContainerConsistency => "container consistency error",
        };
        f.write_str(name)
    }
}

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Errors (E0xx)
    // =========================================================================
    /// Malformed XML.
    ///
    /// The document could not be parsed as XML at all.
    E001,

    /// Unexpected root element.
    ///
    /// The root element of a CellDL document must be `cell-diagram`.
    E002,

    /// Foreign namespace.
    ///
    /// The root element declares a namespace other than the CellDL one.
    E003,

    // =========================================================================
    // Stylesheet Errors (E1xx)
    // =========================================================================
    /// Malformed selector.
    ///
    /// A selector uses syntax that is not supported, including pseudo-classes.
    E100,

    /// Malformed stylesheet block.
    ///
    /// A rule is missing its braces or a declaration is missing its colon.
    E101,

    /// External stylesheet could not be loaded.
    E102,

    /// Invalid style value.
    ///
    /// A style property that must be interpreted, such as the diagram
    /// `width`, has a value of the wrong kind.
    E103,

    // =========================================================================
    // Structural Errors (E2xx)
    // =========================================================================
    /// Unexpected element.
    ///
    /// An element was found where its tag is not allowed.
    E200,

    /// Duplicate singleton.
    ///
    /// A second `diagram` or `bond-graph` element was found.
    E201,

    /// Transporter outside a compartment.
    ///
    /// Transporters sit on compartment boundaries, so they must be direct
    /// children of a `compartment`.
    E202,

    /// Missing id.
    E203,

    /// Duplicate id.
    ///
    /// Element ids are unique across the whole diagram.
    E204,

    /// Flow without components.
    E205,

    // =========================================================================
    // Reference Errors (E3xx)
    // =========================================================================
    /// Potential without a resolvable quantity.
    E300,

    /// Flow component missing `from` or `to`.
    E301,

    /// Unknown potential.
    E302,

    /// Unknown transporter.
    E303,

    // =========================================================================
    // Container Errors (E4xx)
    // =========================================================================
    /// Inconsistent flow container.
    ///
    /// A flow without a transporter connects potentials of different containers.
    E400,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E400 => "E400",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed XML",
            ErrorCode::E002 => "unexpected root element",
            ErrorCode::E003 => "foreign namespace",
            ErrorCode::E100 => "malformed selector",
            ErrorCode::E101 => "malformed stylesheet block",
            ErrorCode::E102 => "stylesheet could not be loaded",
            ErrorCode::E103 => "invalid style value",
            ErrorCode::E200 => "unexpected element",
            ErrorCode::E201 => "duplicate element",
            ErrorCode::E202 => "transporter outside a compartment",
            ErrorCode::E203 => "missing id",
            ErrorCode::E204 => "duplicate id",
            ErrorCode::E205 => "flow without components",
            ErrorCode::E300 => "unresolved quantity",
            ErrorCode::E301 => "incomplete flow component",
            ErrorCode::E302 => "unknown potential",
            ErrorCode::E303 => "unknown transporter",
            ErrorCode::E400 => "inconsistent flow container",
        }
    }

    /// Returns the category of this error code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001 | ErrorCode::E002 | ErrorCode::E003 => ErrorKind::Document,
            ErrorCode::E100 | ErrorCode::E101 => ErrorKind::Selector,
            ErrorCode::E102 | ErrorCode::E103 => ErrorKind::Stylesheet,
            ErrorCode::E200
            | ErrorCode::E201
            | ErrorCode::E202
            | ErrorCode::E203
            | ErrorCode::E204
            | ErrorCode::E205 => ErrorKind::Structural,
            ErrorCode::E300 | ErrorCode::E301 | ErrorCode::E302 | ErrorCode::E303 => {
                ErrorKind::Reference
            }
            ErrorCode::E400 => ErrorKind::ContainerConsistency,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
