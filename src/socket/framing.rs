//! Length-prefixed framing for raw TCP sockets.
//!
//! Each frame is a 4-byte big-endian length followed by that many bytes.
//! `u32::MAX` is reserved and never accepted as a length.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Largest length a frame can announce.
pub const MAX_ENCODABLE_LEN: usize = u32::MAX as usize - 1;

// ============================================================================
// Encoding
// ============================================================================

/// Encodes `data` into a single length-prefixed frame.
///
/// # Errors
///
/// Returns [`Error::FrameTooLarge`] if `data` cannot be described by the
/// prefix.
pub fn encode_frame(data: &[u8]) -> Result<Vec<u8>> {
    let len = frame_len(data.len())?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + data.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(data);
    Ok(frame)
}

/// Writes `data` as one frame and flushes.
///
/// # Errors
///
/// Returns [`Error::FrameTooLarge`] or [`Error::Io`].
pub async fn write_frame<W>(writer: &mut W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = frame_len(data.len())?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&n| n != u32::MAX)
        .ok_or_else(|| Error::frame_too_large(len, MAX_ENCODABLE_LEN))
}

// ============================================================================
// Decoding
// ============================================================================

/// Reads the next frame.
///
/// Returns `Ok(None)` on a clean end of stream before a new prefix.
/// Not cancel-safe: run it on a task of its own rather than inside
/// `select!`.
///
/// # Errors
///
/// - [`Error::FrameTooLarge`] if the prefix exceeds `max_len`
/// - [`Error::Io`] on read failure or truncation mid-frame
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let announced = u32::from_be_bytes(prefix);
    let len = announced as usize;
    if announced == u32::MAX || len > max_len {
        return Err(Error::frame_too_large(len, max_len));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(&[9, 8, 7]).expect("encode");
        assert_eq!(frame, vec![0, 0, 0, 3, 9, 8, 7]);
    }

    #[tokio::test]
    async fn test_read_consecutive_frames() {
        let mut wire = encode_frame(b"ab").expect("encode");
        wire.extend(encode_frame(b"").expect("encode"));
        let mut reader = wire.as_slice();

        assert_eq!(read_frame(&mut reader, 64).await.expect("read"), Some(b"ab".to_vec()));
        assert_eq!(read_frame(&mut reader, 64).await.expect("read"), Some(Vec::new()));
        assert_eq!(read_frame(&mut reader, 64).await.expect("read"), None);
    }

    #[tokio::test]
    async fn test_rejects_oversized_frame() {
        let wire = encode_frame(&[0u8; 32]).expect("encode");
        let mut reader = wire.as_slice();

        let err = read_frame(&mut reader, 16).await.unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { len: 32, max: 16 }));
    }

    #[tokio::test]
    async fn test_rejects_reserved_length() {
        let wire = u32::MAX.to_be_bytes();
        let mut reader = &wire[..];

        let err = read_frame(&mut reader, usize::MAX).await.unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_truncated_body_is_io_error() {
        let wire = [0u8, 0, 0, 5, 1, 2];
        let mut reader = &wire[..];

        let err = read_frame(&mut reader, 64).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_write_frame_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, b"ping").await.expect("write");

        let frame = read_frame(&mut server, 64).await.expect("read");
        assert_eq!(frame, Some(b"ping".to_vec()));
    }

    #[tokio::test]
    async fn test_prefix_split_across_reads() {
        let mut reader = tokio_test::io::Builder::new()
            .read(&[0, 0])
            .read(&[0, 2, b'h'])
            .read(b"i")
            .build();

        let frame = read_frame(&mut reader, 64).await.expect("read");
        assert_eq!(frame, Some(b"hi".to_vec()));
    }

    #[tokio::test]
    async fn test_write_frame_exact_bytes() {
        let mut writer = tokio_test::io::Builder::new()
            .write(&[0, 0, 0, 3])
            .write(b"abc")
            .build();

        write_frame(&mut writer, b"abc").await.expect("write");
    }
}
