mod helper;
mod path;
mod types;

pub use helper::StorageHelper;
pub use path::{mask_matches, PathParts};
pub use types::{AccessMode, ContentEncoding, DirHandle, FileHandle};
