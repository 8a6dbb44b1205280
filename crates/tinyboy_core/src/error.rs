use std::path::PathBuf;

/// Failure to place an image into the address space.
///
/// Both variants are detected before any byte is copied, so memory contents
/// loaded earlier survive a failed load untouched.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read program image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image of {len} bytes at origin 0x{origin:04X} does not fit in {capacity} bytes of memory")]
    TooLarge {
        len: usize,
        origin: u16,
        capacity: usize,
    },
}
