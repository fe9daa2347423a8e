//! Batch archive export: pack `(filename, png)` pairs into a `.tar.gz`.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Build a gzip-compressed tar archive in memory.
///
/// Entries get mode 644 and a zero mtime so the archive bytes are
/// reproducible for identical inputs.
pub fn write_tar_gz<'a>(
    items: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> std::io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, bytes) in items {
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        builder.append_data(&mut header, name, bytes)?;
    }

    let encoder = builder.into_inner()?;
    let mut out = encoder.finish()?;
    out.flush()?;
    Ok(out)
}
