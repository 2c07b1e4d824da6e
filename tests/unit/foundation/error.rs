use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CompressureError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        CompressureError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert!(
        CompressureError::sequencer("x")
            .to_string()
            .contains("sequencer error:")
    );
    assert!(
        CompressureError::external_tool("x")
            .to_string()
            .contains("external tool error:")
    );
    assert!(
        CompressureError::ManifestMissing {
            path: PathBuf::from("m.json")
        }
        .to_string()
        .contains("persistence error: manifest not found at 'm.json'")
    );
}

#[test]
fn configuration_family_is_classified() {
    assert!(CompressureError::UnsupportedWaveform("square".to_string()).is_configuration());
    assert!(CompressureError::MalformedEncoderConfig { len: 3 }.is_configuration());
    assert!(
        CompressureError::UnrecognizedEncoderOption {
            encoder: "h264".to_string(),
            key: "k".to_string(),
        }
        .is_configuration()
    );
    assert!(!CompressureError::sequencer("x").is_configuration());
    assert!(!CompressureError::SequencerEmpty.is_configuration());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CompressureError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn persistence_write_keeps_source_chain() {
    let err = CompressureError::PersistenceWrite {
        path: PathBuf::from("m.json"),
        source: anyhow::anyhow!("disk full"),
    };
    let s = err.to_string();
    assert!(s.contains("m.json"));
    assert!(s.contains("disk full"));
    assert!(std::error::Error::source(&err).is_some());
}
