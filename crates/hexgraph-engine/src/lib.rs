//! Projection engine: walks records along an include tree and emits
//! hextuples, then assembles them into quads for a writer.

pub mod cache;
pub mod expand;
pub mod fields;
pub mod include;
pub mod policy;
pub mod render;
pub mod resolver;
pub mod traverse;

pub use cache::{MemoryCache, TupleCache};
pub use fields::FieldSelection;
pub use include::{IncludeTree, SelectionError};
pub use policy::{LinkAll, LinkPolicy, SameDocument};
pub use render::{RenderError, RenderOptions, Renderer, assemble, finish_store};
pub use resolver::{Registry, SchemaResolver};
pub use traverse::Projector;
