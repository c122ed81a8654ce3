//! Umbra Assets - OBJ ingestion and asset caching
//!
//! Parses the restricted OBJ subset the viewer understands (`v` positions and
//! fan-triangulated `f` faces) into flat position/index arrays, and caches
//! parsed files by path so a model referenced twice is read once.

mod error;
mod handle;
mod obj;
mod server;

pub use error::ParseError;
pub use handle::{AssetHandle, AssetId};
pub use obj::{load_obj, parse_obj, ObjData};
pub use server::AssetServer;
