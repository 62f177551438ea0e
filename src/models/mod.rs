pub mod transaction;

// Re-export only the types we actually use
pub use transaction::{
    InventoryTransaction, Inspection, ProductType, Provenance, TxAction,
};
