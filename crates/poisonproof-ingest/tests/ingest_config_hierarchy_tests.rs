//! Upload limits loaded from the user and project config directories.
//!
//! Changes HOME and the working directory for the whole process, so this file
//! holds a single test.

use poisonproof_core::DetectionConfig;
use poisonproof_ingest::{IngestConfig, IngestError, Scanner};

#[test]
fn test_layered_limits_reach_the_scanner() {
    let home = tempfile::tempdir().unwrap();
    let project = tempfile::tempdir().unwrap();

    let user_dir = home.path().join(".poisonproof").join("config");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("ingest.yaml"), "max_file_size_mb: 1\n").unwrap();

    let project_dir = project.path().join("config");
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(
        project_dir.join("ingest.yaml"),
        "allowed_extensions: [csv]\n",
    )
    .unwrap();

    let previous_home = std::env::var_os("HOME");
    let previous_dir = std::env::current_dir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_current_dir(project.path()).unwrap();

    let loaded = IngestConfig::load_with_hierarchy();

    std::env::set_current_dir(previous_dir).unwrap();
    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    let config = loaded.unwrap();
    assert_eq!(config.max_file_size_mb, 1);
    assert_eq!(config.allowed_extensions, vec!["csv".to_string()]);

    let scanner = Scanner::new(config, &DetectionConfig::default()).unwrap();
    let big = project.path().join("big.csv");
    std::fs::write(&big, vec![b'1'; 2 * 1024 * 1024]).unwrap();
    assert!(matches!(
        scanner.scan_path(&big),
        Err(IngestError::FileTooLarge { .. })
    ));

    let photo = project.path().join("photo.png");
    std::fs::write(&photo, b"\x89PNG").unwrap();
    assert!(matches!(
        scanner.scan_path(&photo),
        Err(IngestError::UnsupportedFileType(..))
    ));
}
