use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tempfile::TempDir;
use ziptree::{
    Error, Options, archive_directory, archive_directory_with_options, extract_archive,
    extract_archive_with_options, list_archive,
};

/// Deterministic, poorly compressible bytes.
fn pseudo_random(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Relative path -> contents (`None` for directories), normalized to `/`.
fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(root).unwrap();
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_str().unwrap())
            .collect::<Vec<_>>()
            .join("/");
        let contents = if entry.file_type().is_dir() {
            None
        } else {
            Some(fs::read(entry.path()).unwrap())
        };
        out.insert(key, contents);
    }
    out
}

fn sample_tree(root: &Path) {
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("zero.bin"), b"").unwrap();
    fs::write(root.join("one.bin"), b"x").unwrap();
    fs::write(root.join("nested/exact_chunk.bin"), pseudo_random(65_536, 1)).unwrap();
    fs::write(root.join("nested/chunk_plus_one.bin"), pseudo_random(65_537, 2)).unwrap();
    fs::write(
        root.join("nested/deeper/ten_mib.bin"),
        pseudo_random(10 * 1024 * 1024, 3),
    )
    .unwrap();
    fs::write(root.join("nested/deeper/notes.txt"), "hello\n".repeat(500)).unwrap();
}

#[test]
fn round_trip_reproduces_the_tree() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    sample_tree(&source);

    let archive = work.path().join("out/sub/tree.zip");
    let returned = archive_directory(&source, &archive).unwrap();
    assert_eq!(returned, archive);
    assert!(archive.is_file());

    let target = work.path().join("restored");
    let returned = extract_archive(&archive, &target).unwrap();
    assert_eq!(returned, target);

    assert_eq!(snapshot(&target), snapshot(&source));
    assert!(target.join("empty").is_dir());
}

#[test]
fn round_trip_with_small_chunks() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(source.join("a/b")).unwrap();
    fs::write(source.join("a/b/data.bin"), pseudo_random(100_003, 9)).unwrap();

    let options = Options::default().with_chunk_size(1000);
    let archive = work.path().join("small.zip");
    archive_directory_with_options(&source, &archive, &options).unwrap();

    let target = work.path().join("restored");
    extract_archive_with_options(&archive, &target, &options).unwrap();
    assert_eq!(snapshot(&target), snapshot(&source));
}

#[test]
fn root_is_never_an_entry() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("a/b");
    fs::create_dir_all(source.join("child_dir")).unwrap();
    fs::write(source.join("child.txt"), b"child").unwrap();
    fs::write(source.join("child_dir/grandchild.txt"), b"grandchild").unwrap();

    let archive = work.path().join("root.zip");
    archive_directory(&source, &archive).unwrap();

    let names: Vec<String> = list_archive(&archive)
        .unwrap()
        .into_iter()
        .map(|e| e.file_name)
        .collect();
    assert_eq!(names, ["child.txt", "child_dir/", "child_dir/grandchild.txt"]);
    assert!(names.iter().all(|n| !n.is_empty() && n != "." && n != "./"));
    assert!(names.iter().all(|n| !n.starts_with('/') && !n.contains('\\')));
}

#[test]
fn directory_entries_are_flagged() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    sample_tree(&source);
    let archive = work.path().join("tree.zip");
    archive_directory(&source, &archive).unwrap();

    let entries = list_archive(&archive).unwrap();
    for entry in &entries {
        assert_eq!(entry.is_directory, entry.file_name.ends_with('/'));
        if entry.is_directory {
            assert_eq!(entry.uncompressed_size, 0);
        }
    }
    let ten_mib = entries
        .iter()
        .find(|e| e.file_name == "nested/deeper/ten_mib.bin")
        .unwrap();
    assert_eq!(ten_mib.uncompressed_size, 10 * 1024 * 1024);
}

#[test]
fn missing_source_is_invalid_argument() {
    let work = TempDir::new().unwrap();
    let archive = work.path().join("never/created.zip");

    let err = archive_directory(work.path().join("does/not/exist"), &archive).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    assert!(!archive.exists());
    assert!(!work.path().join("never").exists());
}

#[test]
fn empty_paths_are_invalid_arguments() {
    let work = TempDir::new().unwrap();
    assert!(matches!(
        archive_directory("", work.path().join("a.zip")),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        archive_directory(work.path(), ""),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        extract_archive("", work.path()),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn oversized_chunk_is_invalid_argument() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("data.txt"), b"data").unwrap();
    let archive = work.path().join("a.zip");

    let options = Options::default().with_chunk_size(usize::MAX);
    let err = archive_directory_with_options(&source, &archive, &options).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    assert!(!archive.exists());

    archive_directory(&source, &archive).unwrap();
    let err = extract_archive_with_options(&archive, work.path().join("out"), &options)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
}

#[test]
fn file_as_source_is_invalid_argument() {
    let work = TempDir::new().unwrap();
    let file = work.path().join("plain.txt");
    fs::write(&file, b"not a directory").unwrap();

    let err = archive_directory(&file, work.path().join("a.zip")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
}

#[test]
fn archive_inside_source_does_not_include_itself() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("data.txt"), b"data").unwrap();

    let archive = source.join("self.zip");
    archive_directory(&source, &archive).unwrap();
    // Archiving again must also skip the previous output
    archive_directory(&source, &archive).unwrap();

    let names: Vec<String> = list_archive(&archive)
        .unwrap()
        .into_iter()
        .map(|e| e.file_name)
        .collect();
    assert_eq!(names, ["data.txt"]);
}

#[test]
fn cancelled_archive_leaves_nothing_behind() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    sample_tree(&source);
    let out_dir = work.path().join("out");

    let options = Options::default().with_cancel_flag(Arc::new(AtomicBool::new(true)));
    let err = archive_directory_with_options(&source, out_dir.join("a.zip"), &options).unwrap_err();
    assert!(matches!(err, Error::Cancelled));

    // The destination directory exists but holds no archive or staging file
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn existing_archive_is_replaced() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("new.txt"), b"new").unwrap();

    let archive = work.path().join("a.zip");
    fs::write(&archive, b"stale contents that are not a zip").unwrap();
    archive_directory(&source, &archive).unwrap();

    let names: Vec<String> = list_archive(&archive)
        .unwrap()
        .into_iter()
        .map(|e| e.file_name)
        .collect();
    assert_eq!(names, ["new.txt"]);
}

#[test]
fn extraction_overwrites_existing_files() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("file.txt"), b"short").unwrap();
    let archive = work.path().join("a.zip");
    archive_directory(&source, &archive).unwrap();

    let target = work.path().join("target");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("file.txt"), b"a much longer pre-existing file").unwrap();

    extract_archive(&archive, &target).unwrap();
    assert_eq!(fs::read(target.join("file.txt")).unwrap(), b"short");
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("real.txt"), b"real").unwrap();
    std::os::unix::fs::symlink(source.join("real.txt"), source.join("link.txt")).unwrap();

    let archive = work.path().join("a.zip");
    archive_directory(&source, &archive).unwrap();

    let names: Vec<String> = list_archive(&archive)
        .unwrap()
        .into_iter()
        .map(|e| e.file_name)
        .collect();
    assert_eq!(names, ["real.txt"]);
}

#[cfg(unix)]
#[test]
fn names_the_reader_would_misread_are_refused() {
    for file_name in ["a\\b.txt", "trail\\", "c:notes.txt"] {
        let work = TempDir::new().unwrap();
        let source = work.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("fine.txt"), b"one").unwrap();
        fs::write(source.join(file_name), b"two").unwrap();

        let archive = work.path().join("a.zip");
        match archive_directory(&source, &archive).unwrap_err() {
            Error::Io { path, source: err } => {
                assert!(path.ends_with(file_name), "{}", path.display());
                assert_eq!(err.kind(), std::io::ErrorKind::InvalidData, "{file_name}");
            }
            other => panic!("unexpected error for {file_name}: {other}"),
        }
        assert!(!archive.exists(), "{file_name}");
    }
}

#[cfg(unix)]
#[test]
fn colon_in_a_nested_name_round_trips() {
    let work = TempDir::new().unwrap();
    let source = work.path().join("source");
    fs::create_dir_all(source.join("notes")).unwrap();
    fs::write(source.join("notes/c:x.txt"), b"kept").unwrap();

    let archive = work.path().join("a.zip");
    archive_directory(&source, &archive).unwrap();
    let target = work.path().join("restored");
    extract_archive(&archive, &target).unwrap();
    assert_eq!(snapshot(&target), snapshot(&source));
}
