//! Shared fixtures for crate tests

use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, Header};

/// Write a gzipped tar archive with the given (path, content) entries.
pub(crate) fn write_archive(path: &Path, files: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for (name, content) in files {
        let content = content.as_bytes();
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder.append_data(&mut header, *name, content).unwrap();
    }

    let encoder = builder.into_inner().unwrap();
    encoder.finish().unwrap();
}

/// Write a minimal valid challenge pack archive.
pub(crate) fn write_challenge_pack(path: &Path) {
    write_archive(
        path,
        &[
            (
                "Pack.yaml",
                "apiVersion: packgate/v1\nmetadata:\n  name: challenge\n  version: 1.0.0\n  description: Challenge pack\n",
            ),
            ("values.yaml", "ingressClass: traefik\n"),
            (
                "templates/deployment.yaml",
                "kind: Deployment\nname: {{ release.name }}\n",
            ),
            ("templates/_helpers.j2", "{% macro label() %}app{% endmacro %}\n"),
        ],
    );
}
