//! On-disk chunk format: a 4-byte magic, a little-endian `u16` version,
//! then the bincode-encoded [`Chunk`] including nested function chunks.

use std::io::{Read, Write};
use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;

use super::{Chunk, Interner, Value};

pub const MAGIC: &[u8; 4] = b"IBC\0";
pub const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Debug, Error, Diagnostic)]
pub enum ChunkFormatError {
    #[error("not a compiled Ibery++ chunk (bad magic)")]
    #[diagnostic(code(ibery::chunk::magic))]
    BadMagic,

    #[error("unsupported chunk format version {found} (expected {expected})")]
    #[diagnostic(code(ibery::chunk::version))]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("corrupt chunk body: {0}")]
    #[diagnostic(code(ibery::chunk::body))]
    Encoding(#[from] bincode::Error),

    #[error("invalid chunk: {0}")]
    #[diagnostic(code(ibery::chunk::invalid))]
    Invalid(String),

    #[error("chunk i/o failed: {0}")]
    #[diagnostic(code(ibery::chunk::io))]
    Io(#[from] std::io::Error),
}

/// Whether `bytes` start with the compiled chunk magic.
pub fn is_compiled(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

pub fn write_chunk<W: Write>(chunk: &Chunk, mut out: W) -> Result<(), ChunkFormatError> {
    out.write_all(MAGIC)?;
    out.write_all(&FORMAT_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut out, chunk)?;
    out.flush()?;
    Ok(())
}

pub fn to_bytes(chunk: &Chunk) -> Result<Vec<u8>, ChunkFormatError> {
    let mut bytes = Vec::new();
    write_chunk(chunk, &mut bytes)?;
    Ok(bytes)
}

/// Read and validate a chunk. String constants come back interned, so equal
/// text across nested chunks shares one allocation again.
pub fn read_chunk<R: Read>(mut input: R) -> Result<Chunk, ChunkFormatError> {
    let mut header = [0u8; HEADER_LEN];
    input.read_exact(&mut header).map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => ChunkFormatError::BadMagic,
        _ => ChunkFormatError::Io(err),
    })?;

    if &header[..MAGIC.len()] != MAGIC {
        return Err(ChunkFormatError::BadMagic);
    }
    let found = u16::from_le_bytes([header[MAGIC.len()], header[MAGIC.len() + 1]]);
    if found != FORMAT_VERSION {
        return Err(ChunkFormatError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }

    let mut chunk: Chunk = bincode::deserialize_from(input)?;
    chunk.validate().map_err(ChunkFormatError::Invalid)?;

    let mut strings = Interner::new();
    intern_constants(&mut chunk, &mut strings);
    tracing::debug!(
        chunk = %chunk.name,
        instructions = chunk.len(),
        strings = strings.len(),
        "loaded compiled chunk"
    );
    Ok(chunk)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Chunk, ChunkFormatError> {
    read_chunk(bytes)
}

fn intern_constants(chunk: &mut Chunk, strings: &mut Interner) {
    for constant in &mut chunk.constants {
        match constant {
            Value::String(text) => {
                let interned = strings.intern(text);
                *text = interned;
            }
            Value::Function(func) => {
                if let Some(func) = Rc::get_mut(func) {
                    intern_constants(&mut func.chunk, strings);
                }
            }
            _ => {}
        }
    }
}
