use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "scrollseq_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn normalize_unifies_separators_and_dots() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
}

#[test]
fn normalize_rejects_escapes() {
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert!(normalize_rel_path("C:\\frames\\0.png").is_err());
    assert!(normalize_rel_path("seq/../../x.png").is_err());
}

#[test]
fn fs_fetcher_reads_relative_and_file_urls() {
    let tmp = temp_dir("fs_fetcher");
    std::fs::create_dir_all(tmp.join("seq")).unwrap();
    std::fs::write(tmp.join("seq").join("0.bin"), b"abc").unwrap();

    let fetcher = FsFetcher::new(tmp.clone());
    assert_eq!(fetcher.fetch(0, "seq/0.bin").unwrap(), b"abc");
    assert_eq!(fetcher.fetch(0, "file://seq/0.bin").unwrap(), b"abc");

    let missing = fetcher.fetch(3, "seq/1.bin").unwrap_err();
    assert_eq!(missing.index, 3);
    assert_eq!(missing.kind, LoadErrorKind::Fetch);

    let rejected = fetcher.fetch(4, "../0.bin").unwrap_err();
    assert_eq!(rejected.kind, LoadErrorKind::Rejected);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn memory_fetcher_serves_inserted_bytes() {
    let fetcher = MemoryFetcher::new().with("a", vec![1, 2, 3]);
    assert_eq!(fetcher.fetch(0, "a").unwrap(), vec![1, 2, 3]);
    let err = fetcher.fetch(1, "b").unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.url, "b");
}
