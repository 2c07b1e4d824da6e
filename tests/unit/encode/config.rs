use super::*;

#[test]
fn defaults_come_from_registry() {
    let cfg = EncoderConfig::defaults_for("h264").unwrap();
    assert_eq!(cfg.codec, "libx264");
    assert_eq!(cfg.options.get("preset").map(String::as_str), Some("ultrafast"));
    assert!(cfg.validate().is_ok());
}

#[test]
fn user_options_override_defaults() {
    let cfg = EncoderConfig::from_user_options("h264", &["crf", "18", "preset", "slow"]).unwrap();
    assert_eq!(cfg.options["crf"], "18");
    assert_eq!(cfg.options["preset"], "slow");
    assert_eq!(cfg.options["bf"], "0");
}

#[test]
fn unknown_option_is_rejected() {
    let err = EncoderConfig::from_user_options("h264", &["unknown_opt", "1"]).unwrap_err();
    assert!(matches!(
        err,
        CompressureError::UnrecognizedEncoderOption { ref encoder, ref key }
            if encoder == "h264" && key == "unknown_opt"
    ));
    assert!(err.is_configuration());
}

#[test]
fn odd_option_list_is_malformed() {
    let err = EncoderConfig::from_user_options("h264", &["crf"]).unwrap_err();
    assert!(matches!(err, CompressureError::MalformedEncoderConfig { len: 1 }));
}

#[test]
fn unknown_encoder_lists_known_ones() {
    let err = EncoderConfig::from_user_options::<&str>("vp9", &[]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("vp9"));
    assert!(msg.contains("h264"));
}

#[test]
fn validate_catches_injected_keys() {
    let mut cfg = EncoderConfig::defaults_for("mjpeg").unwrap();
    cfg.options.insert("crf".to_string(), "10".to_string());
    assert!(matches!(
        cfg.validate(),
        Err(CompressureError::UnrecognizedEncoderOption { .. })
    ));
}

#[test]
fn ffmpeg_args_are_sorted_pairs() {
    let cfg = EncoderConfig::defaults_for("mpeg4").unwrap();
    assert_eq!(
        cfg.ffmpeg_args(),
        vec!["-c:v", "mpeg4", "-bf", "0", "-qscale:v", "3"]
    );
}
