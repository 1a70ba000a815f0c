use std::{io::Cursor, time::Duration};

use super::*;
use crate::assets::fetch::MemoryFetcher;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn load_frame_decodes_and_reports_failures() {
    let fetcher = MemoryFetcher::new()
        .with("ok.png", png(4, 2))
        .with("junk.png", b"nope".to_vec());

    let frame = load_frame(&fetcher, 0, "ok.png").unwrap();
    assert_eq!((frame.width, frame.height), (4, 2));

    let decode = load_frame(&fetcher, 1, "junk.png").unwrap_err();
    assert_eq!(decode.kind, LoadErrorKind::Decode);
    assert_eq!(decode.index, 1);

    let missing = load_frame(&fetcher, 2, "gone.png").unwrap_err();
    assert_eq!(missing.kind, LoadErrorKind::Fetch);
}

#[test]
fn spawn_all_delivers_every_result_once() {
    let fetcher = MemoryFetcher::new()
        .with("a", png(1, 1))
        .with("c", png(1, 1));
    let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let loader = Loader::new(Some(2)).unwrap();
    let channel = loader.spawn_all(&urls, Arc::new(fetcher));
    assert_eq!(channel.total(), 3);

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = Vec::new();
    while seen.len() < 3 {
        let ev = channel.next_before(deadline).expect("load result");
        seen.push((ev.index, ev.result.is_ok()));
    }
    seen.sort();
    assert_eq!(seen, vec![(0, true), (1, false), (2, true)]);
    assert!(channel.try_next().is_none());
}

#[test]
fn dropped_channel_does_not_poison_workers() {
    let fetcher = Arc::new(MemoryFetcher::new().with("a", png(1, 1)));
    let loader = Loader::new(Some(1)).unwrap();
    drop(loader.spawn_all(&["a".to_string()], fetcher.clone()));

    // The pool keeps serving later batches after an abandoned one.
    let channel = loader.spawn_all(&["a".to_string()], fetcher);
    let ev = channel
        .next_before(Instant::now() + Duration::from_secs(10))
        .unwrap();
    assert!(ev.result.is_ok());
}

struct PanicsOn {
    index: usize,
    inner: MemoryFetcher,
}

impl FrameFetcher for PanicsOn {
    fn fetch(&self, index: usize, url: &str) -> Result<Vec<u8>, LoadError> {
        if index == self.index {
            panic!("fetcher exploded on {url}");
        }
        self.inner.fetch(index, url)
    }
}

#[test]
fn load_frame_reports_panics_as_failures() {
    let fetcher = PanicsOn {
        index: 0,
        inner: MemoryFetcher::new(),
    };
    let err = load_frame(&fetcher, 0, "boom.png").unwrap_err();
    assert_eq!(err.index, 0);
    assert_eq!(err.kind, LoadErrorKind::Fetch);
    assert!(err.message.contains("fetcher exploded on boom.png"));
}

#[test]
fn panicking_fetch_fails_only_its_own_frame() {
    let fetcher = PanicsOn {
        index: 1,
        inner: MemoryFetcher::new()
            .with("a", png(1, 1))
            .with("b", png(1, 1))
            .with("c", png(1, 1)),
    };
    let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let loader = Loader::new(Some(2)).unwrap();
    let channel = loader.spawn_all(&urls, Arc::new(fetcher));
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = Vec::new();
    while seen.len() < 3 {
        let ev = channel.next_before(deadline).expect("load result");
        seen.push((ev.index, ev.result.map(|_| ()).map_err(|e| e.kind)));
    }
    seen.sort_by_key(|(i, _)| *i);
    assert_eq!(
        seen,
        vec![(0, Ok(())), (1, Err(LoadErrorKind::Fetch)), (2, Ok(()))]
    );

    // The pool survives and serves later batches.
    let again = loader.spawn_all(&urls[..1], Arc::new(MemoryFetcher::new().with("a", png(1, 1))));
    assert!(again.next_before(deadline).unwrap().result.is_ok());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(Loader::new(Some(0)).is_err());
}

#[test]
fn progress_accounting() {
    let p = LoadProgress {
        loaded: 2,
        failed: 1,
        total: 4,
    };
    assert_eq!(p.pending(), 1);
    assert!(!p.is_settled());
    assert_eq!(p.ratio(), 0.75);
    assert_eq!(LoadProgress::default().ratio(), 1.0);
}
