//! VHDL file dependency analysis.
//!
//! Given a set of inclusion roots, this crate discovers the VHDL files under
//! them, extracts the design units each file provides and requires with a
//! shallow lexical parse, and linearizes the cross-file dependencies into a
//! compile order a simulator or synthesis tool can consume.
//!
//! ```no_run
//! use vhdlorder::{Include, Project};
//!
//! let resolution = Project::new()
//!     .include(Include::new("rtl"))
//!     .include(Include::new("test"))
//!     .resolve()?;
//! resolution.get_order().write(&mut std::io::stdout())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The result is either a [`Resolution`] carrying the ordered compile steps
//! and any warnings, or the full [`DiagnosticList`] when something fatal was
//! found. Front ends, simulator drivers, and output formatting live outside
//! this crate.

pub mod core;
pub mod error;
pub mod util;

pub use crate::core::include::{Include, InclusionMode, INCLUDE_ENV_VAR};
pub use crate::core::lang::identifier::Identifier;
pub use crate::core::lang::unit::{DesignUnit, Reference, UnitKind};
pub use crate::core::order::{CompileOrder, CompileStep, Role};
pub use crate::core::project::{Context, Project, Resolution, DEFAULT_TOP_PATTERN};
pub use crate::core::version::VhdlVersion;
pub use crate::error::{Diagnostic, DiagnosticList, Severity};
