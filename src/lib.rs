//! A tiny embedded document store.
//!
//! Records live in named collections, one pretty-printed JSON file per
//! record:
//!
//! ```no_run
//! use jsondb::Driver;
//!
//! let db = Driver::new("./db")?;
//! db.write("users", "alice", &serde_json::json!({ "age": 42 }))?;
//! let alice: Option<serde_json::Value> = db.get("users", "alice")?;
//! for raw in db.read_all("users")? {
//!     println!("{}", raw);
//! }
//! db.delete("users", "alice")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod codec;
pub mod driver;
pub mod error;
pub mod locks;
pub mod logger;

pub use driver::{Driver, Options};
pub use error::StoreError;
pub use logger::{FacadeLogger, Level, Logger};

pub const VERSION: &str = "1.0.0";
