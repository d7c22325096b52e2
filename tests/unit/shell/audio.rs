use super::*;

fn with_audio() -> ProfileConfig {
    ProfileConfig {
        audio_url: Some("https://cdn.example/song.mp3".into()),
        audio_autoplay: true,
        ..ProfileConfig::default()
    }
}

#[test]
fn source_prefers_explicit_audio_then_video_track() {
    assert_eq!(AudioSource::select(&ProfileConfig::default()), None);

    let video = ProfileConfig {
        background_type: BackgroundKind::Video,
        background_video_url: Some("bg.mp4".into()),
        ..ProfileConfig::default()
    };
    assert_eq!(
        AudioSource::select(&video),
        Some(AudioSource::BackgroundVideo("bg.mp4".into()))
    );

    let both = ProfileConfig {
        audio_url: Some(" a.mp3 ".into()),
        ..video
    };
    assert_eq!(AudioSource::select(&both), Some(AudioSource::Url("a.mp3".into())));
}

#[test]
fn player_starts_at_half_volume_and_loads_the_source() {
    let mut p = AudioPlayer::from_profile(&with_audio()).expect("player");
    assert_eq!(p.effective_volume(), DEFAULT_VOLUME);
    let cmds = p.drain_commands();
    assert!(matches!(cmds[0], PlaybackCommand::Load(AudioSource::Url(_))));
    assert!(cmds.contains(&PlaybackCommand::SetLoop(true)));
    assert!(p.drain_commands().is_empty());
}

#[test]
fn rejected_autoplay_leaves_the_player_paused() {
    let mut p = AudioPlayer::from_profile(&with_audio()).expect("player");
    p.drain_commands();
    p.request_autoplay();
    p.request_autoplay();
    assert_eq!(p.drain_commands(), vec![PlaybackCommand::Play]);
    p.playback_rejected();
    assert!(!p.is_playing());

    p.toggle_play();
    p.playback_started();
    assert!(p.is_playing());
    p.toggle_play();
    assert_eq!(
        p.drain_commands(),
        vec![PlaybackCommand::Play, PlaybackCommand::Pause]
    );
}

#[test]
fn volume_mute_bass_and_tempo() {
    let mut p = AudioPlayer::from_profile(&with_audio()).expect("player");
    p.drain_commands();

    p.toggle_mute();
    assert_eq!(p.effective_volume(), 0.0);
    p.set_volume(0.8);
    assert_eq!(p.effective_volume(), 0.8, "audible volume unmutes");
    p.set_volume(7.0);
    assert_eq!(p.effective_volume(), 1.0);

    p.toggle_bass_boost();
    assert_eq!(p.bass_gain_db(), BASS_BOOST_DB);
    p.set_tempo(5.0);
    assert_eq!(p.tempo(), 2.0);
    p.set_tempo(f64::NAN);
    assert_eq!(p.tempo(), 2.0);

    let cmds = p.drain_commands();
    assert!(cmds.contains(&PlaybackCommand::SetBassShelf {
        frequency_hz: 200.0,
        gain_db: 15.0,
    }));
    assert_eq!(cmds.last(), Some(&PlaybackCommand::SetPlaybackRate(2.0)));
}

#[test]
fn sits_under_the_card_and_grows_when_expanded() {
    let profile = ProfileConfig {
        show_tempo_slider: true,
        ..with_audio()
    };
    let mut p = AudioPlayer::from_profile(&profile).expect("player");
    let center = Point::new(400.0, 300.0);
    let collapsed = p.bounds(center);
    assert_eq!(collapsed.y0, 480.0);
    assert!((collapsed.center().x - 400.0).abs() < 1e-9);

    p.toggle_expanded();
    assert!(p.bounds(center).width() > collapsed.width());
    assert_eq!(p.paint(center, 25, Positioning::Fixed).kind, LayerKind::Audio);
}
