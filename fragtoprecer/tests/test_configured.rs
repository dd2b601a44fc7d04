use std::fs;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};

use fragtoprecer::{FragToPrecer, Mode, PRECURSORS_FILE, SPECIES_FILE};

#[test_log::test]
#[test_log(default_log_filter = "debug")]
fn test_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = Figment::new()
        .merge(Toml::file_exact("tests/data/configured.toml"))
        .merge(Serialized::default("output_dir", dir.path()));
    let driver: FragToPrecer = config.extract().unwrap();
    assert_eq!(driver.mode, Mode::Both);
    assert_eq!(driver.targets, vec![0, 2]);
    assert_eq!(driver.stride, 1);

    let prog = driver.main().unwrap();
    assert_eq!(prog.frames, 6);
    assert_eq!(prog.points, 7);
    assert_eq!(prog.species, 4);
    assert_eq!(prog.singletons, 2);
    assert_eq!(prog.precursor_groups, 4);
    assert_eq!(prog.precursor_matches, 3);

    assert!(dir.path().join(SPECIES_FILE).exists());
    let text = fs::read_to_string(dir.path().join(PRECURSORS_FILE)).unwrap();
    assert!(text.contains("\"seed\""));
}
