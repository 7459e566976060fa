use std::path::{Path, PathBuf};

use eyelock::{AssembleOptions, RecordingEncoder, assemble};

fn temp_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "eyelock_assemble_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn seed_frames(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), b"frame").unwrap();
    }
}

#[test]
fn assemble_names_output_randomly_and_cleans_up_the_playlist() {
    let root = temp_root("success");
    let frames = root.join("frames");
    seed_frames(&frames, &["0000.png", "0002.png"]);
    let out_dir = root.join("download");

    let mut encoder = RecordingEncoder::new();
    let opts = AssembleOptions {
        fps_in: 10.0,
        fps_out: 30,
    };
    let video = assemble(&mut encoder, &frames, &out_dir, &opts).unwrap();

    assert_eq!(video.parent().unwrap(), out_dir);
    assert_eq!(video.extension().unwrap(), "mp4");
    assert_eq!(video.file_stem().unwrap().len(), 6);

    let job = &encoder.jobs()[0];
    assert_eq!(job.out_path, video);
    assert_eq!(job.fps_in, 10.0);
    assert_eq!(job.fps_out, 30);
    // Playlist lived next to the output under the same id, removed once the
    // encode succeeded.
    assert_eq!(job.playlist_path.file_stem(), video.file_stem());
    assert!(!job.playlist_path.exists());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn distinct_runs_never_collide_on_output_names() {
    let root = temp_root("collide");
    let frames = root.join("frames");
    seed_frames(&frames, &["0000.png"]);
    let out_dir = root.join("download");

    let mut encoder = RecordingEncoder::new();
    let opts = AssembleOptions::default();
    let a = assemble(&mut encoder, &frames, &out_dir, &opts).unwrap();
    let b = assemble(&mut encoder, &frames, &out_dir, &opts).unwrap();
    assert_ne!(a, b);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn failed_encode_keeps_the_playlist_for_diagnostics() {
    let root = temp_root("failure");
    let frames = root.join("frames");
    seed_frames(&frames, &["0002.png", "0000.png", "0001.png"]);
    let out_dir = root.join("download");

    let mut encoder = RecordingEncoder::failing();
    let err = assemble(&mut encoder, &frames, &out_dir, &AssembleOptions::default()).unwrap_err();
    assert!(err.to_string().contains("encoding error:"));

    let job = &encoder.jobs()[0];
    assert!(job.playlist_path.exists());
    assert!(!job.out_path.exists());

    // Lexicographic frame order regardless of directory enumeration order.
    let listing = std::fs::read_to_string(&job.playlist_path).unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("0000.png'"));
    assert!(lines[1].ends_with("0001.png'"));
    assert!(lines[2].ends_with("0002.png'"));
    assert!(lines.iter().all(|l| l.starts_with("file '")));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn empty_frame_folder_fails_with_no_frames() {
    let root = temp_root("empty");
    let frames = root.join("frames");
    std::fs::create_dir_all(&frames).unwrap();

    let mut encoder = RecordingEncoder::new();
    let err = assemble(
        &mut encoder,
        &frames,
        &root.join("download"),
        &AssembleOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("no frames"));
    assert!(encoder.jobs().is_empty());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn non_positive_rates_are_rejected() {
    let root = temp_root("rates");
    let frames = root.join("frames");
    seed_frames(&frames, &["0000.png"]);

    let mut encoder = RecordingEncoder::new();
    for fps_in in [0.0, -1.0, f64::NAN] {
        let opts = AssembleOptions { fps_in, fps_out: 30 };
        assert!(assemble(&mut encoder, &frames, &root.join("download"), &opts).is_err());
    }
    let opts = AssembleOptions {
        fps_in: 10.0,
        fps_out: 0,
    };
    assert!(assemble(&mut encoder, &frames, &root.join("download"), &opts).is_err());
    assert!(encoder.jobs().is_empty());

    std::fs::remove_dir_all(&root).unwrap();
}
