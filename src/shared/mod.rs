//! Cross-process storage for fork edges.
//!
//! Two memfd regions, both inherited by every forked descendant:
//!
//! ```text
//! metadata region                      pages region
//! ┌──────────────────────────┐        ┌────────┬────────┬─────
//! │ pthread_mutex_t (pshared)│ guards │ Page 0 │ Page 1 │ ...
//! │ root pid                 │ ─────► │ 20 × Edge       │
//! │ page count, edge count   │        └────────┴────────┴─────
//! └──────────────────────────┘         grows by ftruncate, remapped per append
//! ```

pub mod header;
pub mod mutex;
pub mod page_store;
pub mod region;

pub use header::{HeaderView, TreeHeader, HEADER_SIZE};
pub use mutex::{SharedMutex, SharedMutexGuard};
pub use page_store::{Page, PageStore, Placement, Snapshot, PAGE_CAPACITY, PAGE_SIZE};
pub use region::{Access, Mapping, RegionNamer, SharedRegion};
