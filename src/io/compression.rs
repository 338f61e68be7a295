//! Transparent decompression of part files.
//!
//! Distributed writers commonly emit compressed part files (`part-00000.csv.gz`).
//! [`open_part`] inspects each file and wraps it with the matching
//! decompressor before handing the stream to a parser.
//!
//! Detection checks the file extension first and falls back to magic bytes,
//! so a gzip file without a `.gz` suffix is still read correctly. Built-in
//! codecs are enabled by feature flags; additional ones can be added at runtime
//! with [`register_codec`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Global codec registry.
static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Arc::new(XzCodec),
    ]
}

/// Snapshot of the registry, initializing it on first use.
fn registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    lock.get_or_insert_with(builtin_codecs).clone()
}

/// Register a custom decompression codec for every subsequent load.
///
/// ```
/// use shardframe::io::compression::{register_codec, CompressionCodec};
/// use std::io::Read;
/// use std::sync::Arc;
///
/// struct Passthrough;
/// impl CompressionCodec for Passthrough {
///     fn name(&self) -> &str { "passthrough" }
///     fn extensions(&self) -> &[&str] { &[".raw"] }
///     fn magic_bytes(&self) -> Option<&[u8]> { None }
///     fn wrap_reader(&self, r: Box<dyn Read + Send>) -> std::io::Result<Box<dyn Read + Send>> {
///         Ok(r)
///     }
/// }
///
/// register_codec(Arc::new(Passthrough));
/// ```
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    lock.get_or_insert_with(builtin_codecs).push(codec);
}

/// A decompression algorithm that can be detected from a file name or its
/// leading bytes.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g. "gzip").
    fn name(&self) -> &str;

    /// Lowercase extensions including the leading dot (e.g. `&[".gz"]`).
    fn extensions(&self) -> &[&str];

    /// Leading signature of the compressed format, if it has a reliable one.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Wrap `reader` so that reads yield decompressed bytes.
    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> io::Result<Box<dyn Read + Send>>;

    /// Whether `head`, the first buffered bytes of a file without a known
    /// extension, is a stream in this format. Defaults to a prefix match on
    /// [`magic_bytes`](Self::magic_bytes).
    fn sniff(&self, head: &[u8]) -> bool {
        self.magic_bytes().is_some_and(|magic| head.starts_with(magic))
    }
}

fn detect_from_extension(path: &Path) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.to_string_lossy().to_lowercase();
    registry()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
}

/// Match registered signatures against the buffered head of `reader`
/// without consuming it.
fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<Arc<dyn CompressionCodec>> {
    let head = reader.fill_buf().ok()?;
    if head.is_empty() {
        return None;
    }
    registry().into_iter().find(|codec| codec.sniff(head))
}

/// Wrap `reader` with decompression when `path_hint` or the stream's leading
/// bytes identify a registered codec; otherwise return it buffered as is.
pub fn auto_detect_reader<R: Read + Send + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn Read + Send>> {
    if let Some(codec) = detect_from_extension(path_hint.as_ref()) {
        tracing::trace!(codec = codec.name(), "codec detected from extension");
        return codec.wrap_reader(Box::new(reader));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buffered) {
        tracing::trace!(codec = codec.name(), "codec detected from magic bytes");
        return codec.wrap_reader(Box::new(buffered));
    }
    Ok(Box::new(buffered))
}

/// Open a part file for reading, decompressing transparently.
pub fn open_part(path: impl AsRef<Path>) -> io::Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    auto_detect_reader(file, path)
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> io::Result<Box<dyn Read + Send>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read + Send>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(b"BZh")
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }

    /// `BZh` is printable text, so also require the block size digit and the
    /// magic of the first block (or of an empty stream's trailer).
    fn sniff(&self, head: &[u8]) -> bool {
        const BLOCK: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
        const END: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];
        head.len() >= 10
            && head.starts_with(b"BZh")
            && (b'1'..=b'9').contains(&head[3])
            && (head[4..10] == BLOCK || head[4..10] == END)
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader(&self, reader: Box<dyn Read + Send>) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(bytes: Vec<u8>, hint: &str) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        auto_detect_reader(io::Cursor::new(bytes), hint)?.read_to_end(&mut out)?;
        Ok(out)
    }

    #[test]
    fn text_starting_with_bzh_is_not_decompressed() {
        let text = b"BZh,count\nx,1\n".to_vec();
        assert_eq!(read_all(text.clone(), "part-0.csv").unwrap(), text);
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn bzip2_stream_detected_without_extension() {
        use std::io::Write;

        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(b"a,b\n1,2\n").unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(read_all(bytes, "part-0.csv").unwrap(), b"a,b\n1,2\n");
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_stream_detected_without_extension() {
        use std::io::Write;

        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"a\n1\n").unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(read_all(bytes, "part-0").unwrap(), b"a\n1\n");
    }
}
