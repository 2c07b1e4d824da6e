use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "compressure_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn segment_cuts_every_superframe() {
    assert_eq!(segment_frame_list(20, 6), vec![6, 12, 18]);
    assert_eq!(segment_frame_list(18, 6), vec![6, 12]);
    assert_eq!(segment_frame_list(6, 6), Vec::<u64>::new());
    assert_eq!(segment_frame_list(3, 6), Vec::<u64>::new());
}

#[test]
fn frame_count_parsing() {
    assert_eq!(parse_frame_count("240\n").unwrap(), 240);
    assert_eq!(parse_frame_count("\n 17,\n").unwrap(), 17);
    assert!(parse_frame_count("").is_err());
    assert!(parse_frame_count("N/A").is_err());
    assert!(parse_frame_count("0").is_err());
}

#[test]
fn concat_list_quotes_paths() {
    let list = concat_list(&[PathBuf::from("/w/a.avi"), PathBuf::from("/w/it's.avi")]);
    assert_eq!(list, "file '/w/a.avi'\nfile '/w/it'\\''s.avi'\n");
}

#[test]
fn container_ext_defaults_to_avi() {
    assert_eq!(container_ext(Path::new("a/b.MP4")), "mp4");
    assert_eq!(container_ext(Path::new("a/b")), "avi");
}

#[test]
fn collect_slices_filters_and_sorts() {
    let dir = temp_dir("collect_slices");
    std::fs::create_dir_all(&dir).unwrap();
    for name in [
        "slice_000002.avi",
        "slice_000000.avi",
        "slice_000001.avi",
        "slice_000003.mp4",
        "other.avi",
    ] {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    let got = collect_slices(&dir, "avi").unwrap();
    let names = got
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["slice_000000.avi", "slice_000001.avi", "slice_000002.avi"]
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn transcode_rejects_bad_config_before_running_anything() {
    let t = FfmpegTranscoder::with_program("definitely-not-ffmpeg");
    let mut encoder = crate::encode::config::EncoderConfig::defaults_for("h264").unwrap();
    encoder
        .options
        .insert("unknown_opt".to_string(), "1".to_string());
    let cfg = TranscodeConfig {
        source: PathBuf::from("missing.mp4"),
        keyframe_interval: 6,
        encoder,
        container: "avi".to_string(),
    };
    let err = t.transcode(&cfg, Path::new("out.avi")).unwrap_err();
    assert!(matches!(
        err,
        CompressureError::UnrecognizedEncoderOption { .. }
    ));
}

#[test]
fn missing_binary_is_an_external_tool_error() {
    let dir = temp_dir("missing_binary");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("src.mp4");
    std::fs::write(&src, b"").unwrap();

    let t = FfmpegTranscoder::with_program("definitely-not-ffmpeg");
    let cfg = TranscodeConfig {
        source: src,
        keyframe_interval: 6,
        encoder: crate::encode::config::EncoderConfig::defaults_for("h264").unwrap(),
        container: "avi".to_string(),
    };
    let err = t.transcode(&cfg, &dir.join("out.avi")).unwrap_err();
    assert!(matches!(err, CompressureError::ExternalTool(_)));

    let c = FfmpegConcatenator::with_program("definitely-not-ffmpeg");
    assert!(c.concatenate(&[], &dir.join("o.avi")).is_err());

    std::fs::remove_dir_all(&dir).ok();
}
