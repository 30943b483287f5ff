//! Project tasks and their Kanban board.
//!
//! Tasks live in one of four columns of a project board and hold a dense,
//! zero-based position within their column. Creating, moving and deleting
//! tasks keeps every column gap-free and duplicate-free, also under
//! concurrent requests. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - The pure ordering engine in [`ordering`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ordering;
pub mod ports;
pub mod services;
