//! # gherkin-core
//!
//! Scenario assembly and example-table synchronization for GherkinEase.
//!
//! Pipeline
//!
//!     raw input ─▶ statement::compose ─▶ scenario::assemble ─▶ tags::extract_tags
//!               ─▶ table::ExampleTable::resize / edit ─▶ render::render
//!
//!     Each stage is a plain function over owned values. [`session::Session`] strings them
//!     together for one interactive user and recomputes only what an event affects.
//!
//! Collaborators
//!
//!     - [`catalog`]: the keyword vocabulary and the Rx/Tx signal tables, read-only.
//!     - [`correction`]: `correct(text) -> text`, dictionary backed or pass-through.
//!     - [`delivery`]: base64 `data:` URIs and download links for the artifact.
//!
//!     The library never prints or reads the environment; that is the CLI's job.

pub mod catalog;
pub mod correction;
pub mod delivery;
pub mod error;
pub mod render;
pub mod scenario;
pub mod session;
pub mod statement;
pub mod table;
pub mod tags;

pub use error::{GherkinError, Result};
pub use render::render;
pub use scenario::{assemble, ScenarioType};
pub use session::{Session, SessionEvent, SessionSettings};
pub use statement::{compose, ClauseKind, Statement};
pub use table::{CellValue, ExampleTable, ResizePolicy};
pub use tags::extract_tags;
