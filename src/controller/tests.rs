use super::*;
use crate::camera::{CaptureDevice, TestPatternCamera};
use crate::config::SelfcamConfig;
use crate::countdown::TICK_PERIOD;
use crate::cues::{Cue, CuePlayer};
use crate::error::{CaptureError, GalleryError, SelfcamError};
use crate::events::{EventBus, EventFilter, EventReceiver, SelfcamEvent};
use crate::gallery::GalleryLauncher;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingCues {
    played: Mutex<Vec<Cue>>,
}

impl RecordingCues {
    fn played(&self) -> Vec<Cue> {
        self.played.lock().unwrap().clone()
    }
}

impl CuePlayer for RecordingCues {
    fn play(&self, cue: Cue) {
        self.played.lock().unwrap().push(cue);
    }
}

#[derive(Default)]
struct RecordingGallery {
    fail: bool,
    launched: Mutex<Vec<(String, String)>>,
}

impl RecordingGallery {
    fn launched(&self) -> Vec<(String, String)> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl GalleryLauncher for RecordingGallery {
    async fn launch(&self, uri: &str, mime_type: &str) -> Result<(), GalleryError> {
        self.launched
            .lock()
            .unwrap()
            .push((uri.to_string(), mime_type.to_string()));
        if self.fail {
            Err(GalleryError::Launch {
                uri: uri.to_string(),
                details: "no viewer".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

struct Harness {
    controller: CaptureController,
    camera: Arc<TestPatternCamera>,
    cues: Arc<RecordingCues>,
    gallery: Arc<RecordingGallery>,
    events: EventReceiver,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with(|builder| builder)
    }

    fn with<F>(customize: F) -> Self
    where
        F: FnOnce(CaptureControllerBuilder) -> CaptureControllerBuilder,
    {
        Self::with_gallery(RecordingGallery::default(), customize)
    }

    fn with_gallery<F>(gallery: RecordingGallery, customize: F) -> Self
    where
        F: FnOnce(CaptureControllerBuilder) -> CaptureControllerBuilder,
    {
        let dir = TempDir::new().unwrap();
        let mut config = SelfcamConfig::default();
        config.capture.save_directory = dir.path().to_string_lossy().into_owned();
        config.camera.resolution = (16, 12);
        config.display.resolution = (32, 24);

        let camera = Arc::new(TestPatternCamera::new(config.camera.resolution));
        let cues = Arc::new(RecordingCues::default());
        let gallery = Arc::new(gallery);
        let event_bus = Arc::new(EventBus::new(256));
        let events = event_bus.subscribe_filtered(EventFilter::All, "test");

        let builder = CaptureControllerBuilder::new()
            .config(config)
            .camera(camera.clone() as Arc<dyn CaptureDevice>)
            .cues(cues.clone() as Arc<dyn CuePlayer>)
            .gallery(gallery.clone() as Arc<dyn GalleryLauncher>)
            .event_bus(event_bus)
            // Ticks are fed by hand unless a test asks otherwise
            .tick_period(Duration::from_secs(3600));

        Self {
            controller: customize(builder).build().unwrap(),
            camera,
            cues,
            gallery,
            events,
            dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn drain_events(&mut self) -> Vec<SelfcamEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn photo_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn assert_png(path: &Path, dimensions: (u32, u32)) {
    let image = image::open(path).unwrap();
    assert_eq!((image.width(), image.height()), dimensions);
}

#[test]
fn test_builder_requires_collaborators() {
    let result = CaptureControllerBuilder::new()
        .config(SelfcamConfig::default())
        .build();
    assert!(matches!(result, Err(SelfcamError::Component { .. })));
}

#[tokio::test]
async fn test_start_preview_selects_default_timer() {
    let mut h = Harness::new();

    h.controller.start_preview().await.unwrap();

    assert!(h.controller.is_preview_attached());
    assert!(h.controller.preview().unwrap().is_playing());
    assert_eq!(h.controller.session().timer_value, 2);
    assert_eq!(h.camera.streams_opened(), 1);

    let events = h.drain_events();
    assert_eq!(
        events,
        vec![
            SelfcamEvent::PreviewStarted {
                source: "test-pattern:0".to_string()
            },
            SelfcamEvent::TimerSelected { seconds: 2 },
        ]
    );
}

#[tokio::test]
async fn test_empty_directory_hides_thumbnail() {
    let mut h = Harness::new();

    assert!(!h.controller.set_last_photo().await.unwrap());
    assert!(h.controller.session().filename.is_empty());
    assert!(h.controller.thumbnail().is_none());
    assert!(h
        .drain_events()
        .contains(&SelfcamEvent::ThumbnailChanged { path: None }));

    assert!(!h.controller.launch_preview().await);
    assert!(h.gallery.launched().is_empty());
}

#[tokio::test]
async fn test_last_photo_resumes_numbering() {
    let mut h = Harness::new();
    std::fs::write(h.path("selfcam_widget_003.png"), b"old").unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    std::fs::write(h.path("selfcam_widget_007.png"), b"newer").unwrap();
    std::fs::write(h.path("holiday.png"), b"not ours").unwrap();

    assert!(h.controller.set_last_photo().await.unwrap());

    let session = h.controller.session();
    assert_eq!(session.filename, "selfcam_widget_007.png");
    assert_eq!(session.sequence.value(), 7);
    assert_eq!(
        session.load_directory,
        format!("{}/", h.dir.path().display())
    );
    assert_eq!(
        h.controller.thumbnail(),
        Some(h.path("selfcam_widget_007.png").as_path())
    );

    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    assert_eq!(h.controller.session().filename, "selfcam_widget_008.png");
    assert_png(&h.path("selfcam_widget_008.png"), (32, 24));
}

#[tokio::test]
async fn test_sequence_wraps_to_001() {
    let mut h = Harness::new();
    std::fs::write(h.path("selfcam_widget_999.png"), b"last").unwrap();

    h.controller.set_last_photo().await.unwrap();
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();

    assert_eq!(h.controller.session().filename, "selfcam_widget_001.png");
    assert!(h.path("selfcam_widget_001.png").exists());
}

#[tokio::test]
async fn test_countdown_takes_one_photo_after_n_ticks() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.drain_events();

    h.controller.start_countdown(Some(3));
    assert_eq!(h.controller.session().phase, CapturePhase::CountingDown);
    assert!(h.controller.has_active_timer());

    h.controller.on_countdown_tick().await.unwrap();
    h.controller.on_countdown_tick().await.unwrap();
    assert!(h.photo_names().is_empty());

    h.controller.on_countdown_tick().await.unwrap();
    assert_eq!(h.photo_names(), vec!["selfcam_widget_002.png"]);
    assert_png(&h.path("selfcam_widget_002.png"), (32, 24));

    assert!(!h.controller.has_active_timer());
    assert_eq!(h.controller.session().phase, CapturePhase::Idle);
    assert_eq!(
        h.cues.played(),
        vec![Cue::Count, Cue::Count, Cue::Count, Cue::Shutter]
    );

    let saved = h.path("selfcam_widget_002.png");
    assert_eq!(
        h.drain_events(),
        vec![
            SelfcamEvent::ThumbnailChanged { path: None },
            SelfcamEvent::CountdownStarted { remaining: 3 },
            SelfcamEvent::CountdownTick { remaining: 2 },
            SelfcamEvent::CountdownTick { remaining: 1 },
            SelfcamEvent::CountdownFinished,
            SelfcamEvent::PhotoCaptured {
                filename: "selfcam_widget_002.png".to_string()
            },
            SelfcamEvent::ThumbnailChanged {
                path: Some(saved.clone())
            },
            SelfcamEvent::PhotoSaved { path: saved },
        ]
    );
}

#[tokio::test]
async fn test_restarting_countdown_ignores_stale_ticks() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();

    h.controller.start_countdown(Some(10));
    let first = h.controller.ticker_generation().unwrap();

    h.controller.start_countdown(Some(5));
    let second = h.controller.ticker_generation().unwrap();
    assert_ne!(first, second);

    h.controller
        .handle_command(ControllerCommand::CountdownTick { generation: first })
        .await
        .unwrap();
    assert_eq!(h.controller.session().countdown_remaining(), 5);

    h.controller
        .handle_command(ControllerCommand::CountdownTick { generation: second })
        .await
        .unwrap();
    assert_eq!(h.controller.session().countdown_remaining(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_restarting_countdown_stops_first_ticker() {
    let mut h = Harness::with(|builder| builder.tick_period(TICK_PERIOD));
    h.controller.start_preview().await.unwrap();

    h.controller.start_countdown(Some(10));
    let first = h.controller.ticker_generation().unwrap();
    h.controller.start_countdown(Some(5));
    let second = h.controller.ticker_generation().unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let mut ticks = Vec::new();
    while let Ok(Some(command)) =
        tokio::time::timeout(Duration::from_millis(1), h.controller.next_command()).await
    {
        if let ControllerCommand::CountdownTick { generation } = command {
            ticks.push(generation);
        }
    }

    assert_eq!(ticks, vec![second; 3]);
    assert!(!ticks.contains(&first));
}

#[tokio::test]
async fn test_countdown_locks_timer_and_thumbnail() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    let saved = h.path("selfcam_widget_002.png");
    assert_eq!(h.controller.thumbnail(), Some(saved.as_path()));
    h.drain_events();

    h.controller.start_countdown(Some(2));
    assert!(h.controller.thumbnail().is_none());
    assert_eq!(
        h.drain_events(),
        vec![
            SelfcamEvent::ThumbnailChanged { path: None },
            SelfcamEvent::CountdownStarted { remaining: 2 },
        ]
    );

    h.controller
        .handle_command(ControllerCommand::SetTimer(5))
        .await
        .unwrap();
    h.controller
        .handle_command(ControllerCommand::LaunchPreview)
        .await
        .unwrap();
    assert_eq!(h.controller.session().timer_value, 2);
    assert!(h.gallery.launched().is_empty());

    h.controller.on_countdown_tick().await.unwrap();
    h.controller.on_countdown_tick().await.unwrap();
    let newest = h.path("selfcam_widget_003.png");
    assert_eq!(h.controller.thumbnail(), Some(newest.as_path()));

    h.controller
        .handle_command(ControllerCommand::SetTimer(5))
        .await
        .unwrap();
    assert_eq!(h.controller.session().timer_value, 5);
}

#[tokio::test]
async fn test_failed_capture_restores_thumbnail() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    let saved = h.path("selfcam_widget_002.png");

    h.controller.start_countdown(Some(1));
    h.controller.on_visibility_changed(Visibility::Hidden).await;
    h.drain_events();

    // The preview is detached, so the snapshot fails
    assert!(h.controller.take_photo().await.is_err());

    assert_eq!(h.controller.session().filename, "selfcam_widget_002.png");
    assert_eq!(h.controller.thumbnail(), Some(saved.as_path()));
    assert!(h
        .drain_events()
        .contains(&SelfcamEvent::ThumbnailChanged { path: Some(saved) }));
}

#[tokio::test]
async fn test_shutter_uses_selected_timer() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();

    h.controller
        .handle_command(ControllerCommand::SetTimer(5))
        .await
        .unwrap();
    h.controller.set_timer(0);
    assert_eq!(h.controller.session().timer_value, 5);

    h.controller
        .handle_command(ControllerCommand::Shutter)
        .await
        .unwrap();
    assert_eq!(h.controller.session().countdown_remaining(), 5);
}

#[tokio::test]
async fn test_empty_canvas_alerts_and_clears_filename() {
    let mut h = Harness::with(|builder| builder.display_resolution((0, 0)));
    h.controller.start_preview().await.unwrap();
    h.drain_events();

    let result = h.controller.take_photo().await;

    assert!(matches!(
        result,
        Err(SelfcamError::Capture(CaptureError::EmptyPayload))
    ));
    assert!(h.controller.session().filename.is_empty());
    assert!(h.photo_names().is_empty());
    assert!(h.drain_events().contains(&SelfcamEvent::Alert {
        message: "Data source error: No image source".to_string()
    }));
}

#[tokio::test]
async fn test_take_photo_replaces_existing_file() {
    let mut h = Harness::new();
    std::fs::write(h.path("selfcam_widget_002.png"), b"stale").unwrap();

    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();

    let bytes = std::fs::read(h.path("selfcam_widget_002.png")).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_capture_without_preview_keeps_sequence() {
    let mut h = Harness::new();

    let result = h.controller.take_photo().await;

    assert!(matches!(
        result,
        Err(SelfcamError::Capture(CaptureError::PreviewDetached))
    ));
    assert_eq!(h.controller.session().sequence.value(), 1);
    assert!(h.controller.session().filename.is_empty());
    assert_eq!(h.controller.session().phase, CapturePhase::Idle);
}

#[tokio::test]
async fn test_hidden_then_visible_resumes_countdown() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.controller.start_countdown(Some(5));
    h.controller.on_countdown_tick().await.unwrap();
    h.drain_events();

    h.controller.on_visibility_changed(Visibility::Hidden).await;
    assert!(!h.controller.is_preview_attached());
    assert!(!h.controller.has_active_timer());
    assert_eq!(h.controller.session().countdown_remaining(), 4);

    h.controller.on_visibility_changed(Visibility::Visible).await;
    assert!(h.controller.is_preview_attached());
    assert!(h.controller.has_active_timer());
    assert_eq!(h.controller.session().countdown_remaining(), 4);
    assert_eq!(h.camera.streams_opened(), 1);

    let events = h.drain_events();
    assert!(events.contains(&SelfcamEvent::PreviewDetached));
    assert!(events.contains(&SelfcamEvent::PreviewStarted {
        source: "test-pattern:0".to_string()
    }));
    assert!(events.contains(&SelfcamEvent::CountdownStarted { remaining: 4 }));
}

#[tokio::test]
async fn test_visibility_without_stream_keeps_countdown() {
    let mut h = Harness::new();
    h.controller.start_countdown(Some(5));

    h.controller.on_visibility_changed(Visibility::Hidden).await;

    assert!(h.controller.has_active_timer());
    assert_eq!(h.controller.session().countdown_remaining(), 5);
    assert_eq!(h.controller.session().phase, CapturePhase::CountingDown);
}

#[tokio::test]
async fn test_visible_without_countdown_does_not_start_one() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();

    h.controller.on_visibility_changed(Visibility::Hidden).await;
    h.controller.on_visibility_changed(Visibility::Visible).await;

    assert!(!h.controller.has_active_timer());
    assert_eq!(h.controller.session().phase, CapturePhase::Idle);
}

#[tokio::test]
async fn test_visible_reloads_deleted_photo() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    std::fs::remove_file(h.path("selfcam_widget_002.png")).unwrap();

    h.controller.on_visibility_changed(Visibility::Hidden).await;
    h.controller.on_visibility_changed(Visibility::Visible).await;

    assert!(h.controller.session().filename.is_empty());
    assert!(h.controller.thumbnail().is_none());
}

#[tokio::test]
async fn test_visibility_before_preview_is_ignored() {
    let mut h = Harness::new();

    h.controller.on_visibility_changed(Visibility::Visible).await;

    assert!(!h.controller.is_preview_attached());
    assert_eq!(h.camera.streams_opened(), 0);
}

#[tokio::test]
async fn test_launch_preview_opens_current_photo() {
    let mut h = Harness::new();
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    h.drain_events();

    assert!(h.controller.launch_preview().await);

    let uri = format!("file://{}/selfcam_widget_002.png", h.dir.path().display());
    assert_eq!(
        h.gallery.launched(),
        vec![(uri.clone(), "image/*".to_string())]
    );
    assert_eq!(
        h.drain_events(),
        vec![SelfcamEvent::GalleryLaunched { uri }]
    );
}

#[tokio::test]
async fn test_failed_launch_still_reports_request() {
    let gallery = RecordingGallery {
        fail: true,
        ..Default::default()
    };
    let mut h = Harness::with_gallery(gallery, |builder| builder);
    h.controller.start_preview().await.unwrap();
    h.controller.take_photo().await.unwrap();
    h.drain_events();

    assert!(h.controller.launch_preview().await);
    assert_eq!(h.gallery.launched().len(), 1);
    assert!(h.drain_events().is_empty());
}

#[tokio::test]
async fn test_run_loop_counts_down_and_saves() {
    let Harness {
        controller,
        cues,
        mut events,
        dir,
        ..
    } = Harness::with(|builder| builder.tick_period(Duration::from_millis(10)));

    let sender = controller.command_sender();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(controller.run(cancel.clone()));

    sender.send(ControllerCommand::Shutter).unwrap();

    let saved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let SelfcamEvent::PhotoSaved { path } = events.recv().await.unwrap() {
                return path;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(saved, dir.path().join("selfcam_widget_002.png"));
    assert_eq!(cues.played().last(), Some(&Cue::Shutter));

    sender.send(ControllerCommand::Shutdown).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_run_loop_reports_errors_and_stops_on_cancel() {
    let Harness {
        controller,
        mut events,
        ..
    } = Harness::with(|builder| builder.tick_period(Duration::from_millis(10)));

    let sender = controller.command_sender();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(controller.run(cancel.clone()));

    // No preview was started, so the shutter cannot capture
    sender.send(ControllerCommand::Shutter).unwrap();

    let error = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let SelfcamEvent::SystemError { component, error } = events.recv().await.unwrap() {
                return (component, error);
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(error.0, "controller");
    assert_eq!(error.1, "Capture error: No preview attached");

    cancel.cancel();
    handle.await.unwrap().unwrap();
}
