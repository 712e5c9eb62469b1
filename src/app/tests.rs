use super::*;
use crate::config::SelfcamConfig;
use crate::controller::ControllerCommand;
use crate::events::{EventFilter, SelfcamEvent};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn create_test_config(dir: &TempDir) -> SelfcamConfig {
    let mut config = SelfcamConfig::default();
    config.capture.save_directory = dir.path().join("photos").to_string_lossy().into_owned();
    config.camera.resolution = (16, 12);
    config.display.resolution = (32, 24);
    config.cues.enabled = false;
    config
}

fn test_options() -> AppOptions {
    AppOptions {
        force_test_pattern: true,
        keyboard_enabled: false,
        status: None,
    }
}

#[tokio::test]
async fn test_app_creates_save_directory() {
    let dir = TempDir::new().unwrap();
    let app = SelfcamApp::new(create_test_config(&dir), test_options())
        .await
        .unwrap();

    assert!(dir.path().join("photos").is_dir());
    assert!(std::path::Path::new(&app.config().capture.save_directory).is_absolute());

    let states = app.get_all_component_states().await;
    assert!(states.is_empty());
}

#[tokio::test]
async fn test_app_lifecycle() {
    let dir = TempDir::new().unwrap();
    let mut app = SelfcamApp::new(create_test_config(&dir), test_options())
        .await
        .unwrap();

    app.initialize().await.unwrap();
    assert_eq!(
        app.get_component_state("controller").await,
        Some(ComponentState::Stopped)
    );
    assert_eq!(app.get_component_state("keyboard").await, None);

    app.start().await.unwrap();
    assert_eq!(
        app.get_component_state("controller").await,
        Some(ComponentState::Running)
    );
    assert!(app.start().await.is_err());

    let exit_code = app.shutdown().await.unwrap();
    assert_eq!(exit_code, 0);
    assert_eq!(
        app.get_component_state("controller").await,
        Some(ComponentState::Stopped)
    );
}

#[tokio::test]
async fn test_app_takes_photo_on_command() {
    let dir = TempDir::new().unwrap();
    let mut app = SelfcamApp::new(create_test_config(&dir), test_options())
        .await
        .unwrap();
    let mut saves = app
        .event_bus()
        .subscribe_filtered(EventFilter::EventTypes(vec!["photo_saved"]), "test");

    app.initialize().await.unwrap();
    app.start().await.unwrap();

    let commands = app.command_sender();
    commands.send(ControllerCommand::SetTimer(1)).unwrap();
    commands.send(ControllerCommand::Shutter).unwrap();

    let event = timeout(Duration::from_secs(5), saves.recv())
        .await
        .unwrap()
        .unwrap();
    let path = match event {
        SelfcamEvent::PhotoSaved { path } => path,
        other => panic!("unexpected event {:?}", other),
    };
    assert_eq!(path.file_name().unwrap(), "selfcam_widget_002.png");
    assert!(path.starts_with(dir.path().canonicalize().unwrap()));

    assert_eq!(app.shutdown().await.unwrap(), 0);
}

#[tokio::test]
async fn test_app_resumes_numbering_from_disk() {
    let dir = TempDir::new().unwrap();
    let photos = dir.path().join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    std::fs::write(photos.join("selfcam_widget_041.png"), b"png").unwrap();

    let mut app = SelfcamApp::new(create_test_config(&dir), test_options())
        .await
        .unwrap();
    let mut saves = app
        .event_bus()
        .subscribe_filtered(EventFilter::EventTypes(vec!["photo_saved"]), "test");

    app.start().await.unwrap();
    let commands = app.command_sender();
    commands.send(ControllerCommand::SetTimer(1)).unwrap();
    commands.send(ControllerCommand::Shutter).unwrap();

    let event = timeout(Duration::from_secs(5), saves.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        SelfcamEvent::PhotoSaved {
            path: photos.canonicalize().unwrap().join("selfcam_widget_042.png")
        }
    );

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_quit_request_ends_run() {
    let dir = TempDir::new().unwrap();
    let mut app = SelfcamApp::new(create_test_config(&dir), test_options())
        .await
        .unwrap();
    let event_bus = app.event_bus();

    app.initialize().await.unwrap();
    app.start().await.unwrap();

    let run = tokio::spawn(async move { app.run().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    event_bus
        .publish(SelfcamEvent::ShutdownRequested {
            reason: "test".to_string(),
        })
        .unwrap();

    let exit_code = timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(exit_code, 0);
}
