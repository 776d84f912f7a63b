//! Inventory expiry pipeline.
//!
//! Loads an inventory table, classifies rows as expired or about to expire,
//! routes each chat message to the matching subset and serializes it as the
//! assistant's context. Dashboard views (urgent, reorder, category risk)
//! are derived from the same table.

pub mod classifier;
pub mod components;
pub mod error;
pub mod export;
pub mod filter;
pub mod inventory_loader;
pub mod router;
pub mod schema;
pub mod selector;
pub mod serializer;
pub mod session;
pub mod thresholds;
pub mod types;
pub mod util;
pub mod views;

pub use classifier::{classify, ExpiryClassification};
pub use error::{ConfigError, ExportError, LoadError, SchemaError, TurnError};
pub use inventory_loader::{load_bytes, load_inventory, load_inventory_file, load_path, Upload};
pub use router::{route, ContextScope, ContextSelection, EmptyContext};
pub use schema::{canonical_header, Column, Schema};
pub use serializer::serialize;
pub use session::{ChatTurn, Interaction, LoadOutcome, Role, Session, SessionSettings, Transcript};
pub use thresholds::{ExpiryWindow, Thresholds};
pub use types::{ActionPriority, InventoryRecord, InventoryTable};
