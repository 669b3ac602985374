//! Structured-config parsers used by the merge strategies
//!
//! - `ini` - INI documents (`setup.cfg`, `tox.ini`, `.pylintrc`) with a
//!   deterministic pretty printer
//! - `requirements` - dependency lists stored as multi-line INI values

pub mod ini;
pub mod requirements;

pub use ini::{IniDocument, IniSection};
