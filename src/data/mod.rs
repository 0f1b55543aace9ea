//! Data layer: core types, text codec, loading, and column selection.
//!
//! Architecture:
//! ```text
//!  API rows (JSON)        pasted / edited text
//!        │                       │
//!        ▼                       ▼
//!   ┌──────────┐           ┌──────────┐
//!   │  loader   │           │  codec    │  parse ⇄ serialize
//!   └──────────┘           └──────────┘
//!        │                       │
//!        └───────────┬───────────┘
//!                    ▼
//!          ┌────────────────┐
//!          │ TabularDataset │  ordered columns, aligned rows
//!          └────────────────┘
//!                    │
//!                    ▼
//!          ┌────────────────┐
//!          │   selection    │  reconcile plotted columns
//!          └────────────────┘
//! ```

pub mod codec;
pub mod loader;
pub mod model;
pub mod selection;
