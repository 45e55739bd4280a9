//! Dataset loading and storage
//!
//! ```text
//!  smartphone1.csv   smartphone2.csv        tracks.csv
//!        │                 │                    │
//!        ▼                 ▼                    ▼
//!   load_file(_, 1)   load_file(_, 2)    load_grouped_file
//!        │                 │             (one source per point number)
//!        └──── Fragment ───┘                    │
//!                 │                             │
//!                 ▼                             ▼
//!              merge  ───────────────────►  Dataset
//!                               (stable sort by timestamp, bounds,
//!                                per-source index)
//! ```

pub mod loader;
pub mod types;

pub use loader::{
    load, load_file, load_folder, load_grouped, load_grouped_file, merge, parse_records,
};
pub use types::{Dataset, Fragment, LoadReport};
