//! Test doubles and fixtures shared by unit tests

use crate::error::{JlinkError, JlinkResult};
use crate::fetch::{write_atomically, Fetcher};
use crate::platform::{Arch, Implementation, Os};
use crate::release::ReleaseDescriptor;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// In-memory fetcher serving canned responses and recording every request
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fetcher that sleeps before answering, to widen race windows
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn insert(&self, url: &str, body: Vec<u8>) {
        self.responses.lock().insert(url.to_string(), body);
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests made for one URL
    pub fn count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }

    async fn respond(&self, url: &str) -> JlinkResult<Vec<u8>> {
        self.requests.lock().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| JlinkError::http_status(url, "404 Not Found"))
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_bytes(&self, url: &str) -> JlinkResult<Vec<u8>> {
        self.respond(url).await
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> JlinkResult<u64> {
        let body = self.respond(url).await?;
        write_atomically(dest, |file| {
            file.write_all(&body)?;
            Ok(body.len() as u64)
        })
        .map_err(|e| JlinkError::fetch(url, e))
    }
}

/// Entry of an in-memory archive fixture
pub enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
    Executable(&'a str, &'a [u8]),
}

/// Build a `.tar.gz` archive in memory
pub fn tar_gz(entries: &[Entry<'_>]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        let (path, data, mode, kind): (&str, &[u8], u32, tar::EntryType) = match entry {
            Entry::Dir(path) => (*path, &[], 0o755, tar::EntryType::Directory),
            Entry::File(path, data) => (*path, *data, 0o644, tar::EntryType::Regular),
            Entry::Executable(path, data) => (*path, *data, 0o755, tar::EntryType::Regular),
        };
        header.set_entry_type(kind);
        header.set_mode(mode);
        header.set_size(data.len() as u64);
        header.set_mtime(0);
        builder
            .append_data(&mut header, path, data)
            .expect("append fixture entry");
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("finish fixture archive")
}

/// Stand-in for jlink: records its arguments and lays out a fake image
///
/// Writes `args.txt` next to the image's `bin/` and a `legal/` directory, so
/// tests can check both the invocation and the post-processing.
pub const FAKE_JLINK: &[u8] = br#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--output" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -z "$out" ]; then echo "missing --output" >&2; exit 2; fi
mkdir -p "$out/bin" "$out/lib" "$out/legal/java.base"
printf '%s\n' "$@" > "$out/lib/args.txt"
printf 'java' > "$out/bin/java"
printf 'ASSEMBLY_EXCEPTION' > "$out/legal/java.base/LICENSE"
"#;

/// A jlink stand-in that always fails
pub const FAILING_JLINK: &[u8] = b"#!/bin/sh\necho \"Error: module not found: nope\" >&2\nexit 1\n";

/// Archive of a linux runtime root named `jdk-<version>` whose jlink is `jlink`
pub fn linux_runtime_archive(version: &str, jlink: &[u8]) -> Vec<u8> {
    let root = format!("jdk-{}", version);
    let jmods = format!("{}/jmods/", root);
    let base = format!("{}/jmods/java.base.jmod", root);
    let bin = format!("{}/bin/jlink", root);
    let release = format!("{}/release", root);
    let release_text = format!("JAVA_VERSION=\"{}\"\n", version);

    tar_gz(&[
        Entry::Dir(&format!("{}/", root)),
        Entry::Dir(&jmods),
        Entry::File(&base, b"jmod"),
        Entry::Executable(&bin, jlink),
        Entry::File(&release, release_text.as_bytes()),
    ])
}

/// Descriptor of a linux x64 hotspot release served from `https://dl.test/`
pub fn linux_release(version: &str) -> ReleaseDescriptor {
    let file_name = format!(
        "OpenJDK-jdk_x64_linux_hotspot_{}.tar.gz",
        version.replace('+', "_")
    );
    ReleaseDescriptor {
        arch: Arch::X64,
        platform: Os::Linux,
        implementation: Implementation::Hotspot,
        version: version.to_string(),
        link: format!("https://dl.test/{}", file_name),
        file_name,
        checksum: None,
    }
}
