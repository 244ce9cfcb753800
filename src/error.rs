//! Error types for the codec.

use thiserror::Error;

/// Broad class of an [`Error`].
///
/// Every error is fatal; the kind only tells the caller what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A record signature is missing or the archive is cut short.
    Format,
    /// A local header disagrees with its central directory entry.
    Consistency,
    /// The archive (or the input to `create`) needs a feature this codec does not have.
    UnsupportedFeature,
    /// Decompressed data does not match its declared size or CRC-32.
    Integrity,
}

/// Errors that can occur while extracting or creating an archive.
#[derive(Debug, Error)]
pub enum Error {
    /// No end of central directory signature anywhere in the buffer.
    #[error("could not locate end of central directory record")]
    DirectoryNotFound,

    /// A record did not start with its signature.
    #[error("invalid {record} signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature {
        record: &'static str,
        expected: u32,
        actual: u32,
    },

    /// A read ran past the end of the buffer.
    #[error("archive is truncated: {0}")]
    Truncated(#[from] std::io::Error),

    /// An entry name is not valid UTF-8.
    #[error("entry name is not valid UTF-8")]
    InvalidName(#[from] std::string::FromUtf8Error),

    /// A numeric local header field differs from the central directory.
    #[error("local header of {name:?} disagrees on {field}: local {local:#x}, central {central:#x}")]
    FieldMismatch {
        name: String,
        field: &'static str,
        local: u32,
        central: u32,
    },

    /// The local header names a different file than the central directory.
    #[error("local header name {local:?} does not match central directory name {central:?}")]
    NameMismatch { local: String, central: String },

    /// The local extra field differs from the central directory's.
    #[error("local extra field of {0:?} does not match central directory")]
    ExtraFieldMismatch(String),

    /// The archive spans more than one disk.
    #[error("multi-disk archives are not supported ({0})")]
    MultiDisk(&'static str),

    /// Compression method other than stored or deflate.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Something that would need ZIP64 or falls outside a fixed-width field.
    #[error("cannot be represented in a ZIP archive: {0}")]
    Unrepresentable(String),

    /// CRC-32 of the extracted data is wrong.
    #[error("CRC-32 mismatch for {name:?}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Extracted data has the wrong length.
    #[error("size mismatch for {name:?}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: u32,
        actual: usize,
    },

    /// The compressor collaborator failed.
    #[error("{operation} failed for {name:?}: {source}")]
    Compressor {
        operation: &'static str,
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DirectoryNotFound
            | Error::InvalidSignature { .. }
            | Error::Truncated(_)
            | Error::InvalidName(_) => ErrorKind::Format,
            Error::FieldMismatch { .. } | Error::NameMismatch { .. } | Error::ExtraFieldMismatch(_) => {
                ErrorKind::Consistency
            }
            Error::MultiDisk(_) | Error::UnsupportedCompression(_) | Error::Unrepresentable(_) => {
                ErrorKind::UnsupportedFeature
            }
            Error::CrcMismatch { .. } | Error::SizeMismatch { .. } | Error::Compressor { .. } => {
                ErrorKind::Integrity
            }
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::DirectoryNotFound.kind(), ErrorKind::Format);
        assert_eq!(
            Error::ExtraFieldMismatch("a".into()).kind(),
            ErrorKind::Consistency
        );
        assert_eq!(Error::MultiDisk("disk number").kind(), ErrorKind::UnsupportedFeature);
        assert_eq!(Error::UnsupportedCompression(12).kind(), ErrorKind::UnsupportedFeature);
        assert_eq!(
            Error::CrcMismatch {
                name: "a".into(),
                expected: 1,
                actual: 2
            }
            .kind(),
            ErrorKind::Integrity
        );
    }

    #[test]
    fn signature_message_is_hex() {
        let err = Error::InvalidSignature {
            record: "local file header",
            expected: 0x04034b50,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid local file header signature: expected 0x04034b50, got 0x00000000"
        );
    }
}
