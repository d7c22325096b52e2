use super::*;

#[test]
fn frame_requests_coalesce_per_owner() {
    let mut s = Scheduler::new();
    s.request_frame(EffectKind::Particles);
    s.request_frame(EffectKind::Particles);
    s.request_frame(EffectKind::Trail);
    assert_eq!(
        s.take_frame_requests(),
        vec![EffectKind::Particles, EffectKind::Trail]
    );
    assert!(s.take_frame_requests().is_empty());

    let c = s.counters(EffectKind::Particles);
    assert_eq!(c.frames_requested, 1);
    assert_eq!(c.frames_released, 1);
}

#[test]
fn timers_fire_in_due_order_with_ties_by_registration() {
    let mut s = Scheduler::new();
    s.set_timeout(EffectKind::Click, 600.0, 1);
    s.set_timeout(EffectKind::Click, 400.0, 2);
    s.set_timeout(EffectKind::Click, 400.0, 3);

    let tags: Vec<u64> = std::iter::from_fn(|| s.pop_due(1000.0))
        .map(|f| f.tag)
        .collect();
    assert_eq!(tags, vec![2, 3, 1]);
    assert_eq!(s.now_ms(), 600.0);
    assert_eq!(s.active_timers(EffectKind::Click), 0);
}

#[test]
fn timers_not_yet_due_stay_pending() {
    let mut s = Scheduler::new();
    s.set_timeout(EffectKind::Click, 500.0, 7);
    assert!(s.pop_due(499.0).is_none());
    assert_eq!(s.pop_due(500.0).map(|f| f.tag), Some(7));
}

#[test]
fn intervals_reschedule_until_cleared() {
    let mut s = Scheduler::new();
    let id = s.set_interval(EffectKind::Trail, 30.0, 0);
    let mut fired = Vec::new();
    while let Some(f) = s.pop_due(100.0) {
        fired.push(f.at_ms);
    }
    assert_eq!(fired, vec![30.0, 60.0, 90.0]);
    assert!(s.clear_timer(id));
    assert!(!s.clear_timer(id));
    assert!(s.pop_due(1_000.0).is_none());
}

#[test]
fn release_owner_balances_counters() {
    let mut s = Scheduler::new();
    s.request_frame(EffectKind::Trail);
    s.set_interval(EffectKind::Trail, 30.0, 0);
    s.set_timeout(EffectKind::Click, 10.0, 0);
    s.release_owner(EffectKind::Trail);

    let c = s.counters(EffectKind::Trail);
    assert_eq!(c.frames_requested, c.frames_released);
    assert_eq!(c.timers_created, c.timers_released);
    assert!(!s.has_frame_request(EffectKind::Trail));
    assert_eq!(s.active_timers(EffectKind::Click), 1);
}

#[test]
fn clock_never_moves_backwards() {
    let mut s = Scheduler::new();
    s.advance_clock_to(50.0);
    s.advance_clock_to(10.0);
    s.advance_clock_to(f64::NAN);
    assert_eq!(s.now_ms(), 50.0);
}
