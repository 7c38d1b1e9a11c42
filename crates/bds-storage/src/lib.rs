//! Node-tree model and storage backends for BDS containers.
//!
//! A container is a typed tree of named nodes: directories holding
//! insertion-ordered, uniquely named children, and files holding immutable
//! byte payloads. The tree lives in memory while a container is mounted and
//! is persisted through one of two backends implementing the [`Storage`]
//! trait:
//!
//! - [`FsStorage`] — a plain directory tree on disk
//! - [`ContainerStorage`] — a single `.bdc` container file (compressed,
//!   checksummed framing)
//!
//! Both backends operate on the same [`Directory`] tree type, so every tree
//! operation has byte-identical semantics regardless of how the bytes are
//! physically packed. A shared conformance suite in `tests/` exercises both.
//!
//! Backend selection by logical name is handled by [`resolve_storage`]:
//! a plain subdirectory wins over a `<name>.bdc` file; neither existing is a
//! user error raised before any mount attempt.

pub mod container;
pub mod fs;
pub mod node;
pub mod resolve;
pub mod traits;

pub use container::ContainerStorage;
pub use fs::FsStorage;
pub use node::{Directory, File, Node};
pub use resolve::{resolve_storage, CONTAINER_EXTENSION};
pub use traits::Storage;
