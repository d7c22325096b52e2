use super::harness::Harness;
use super::*;

#[test]
fn release_balances_every_registration() {
    let mut h = Harness::window(100.0, 100.0);
    let mut res = Resources::new(EffectKind::Trail);
    res.listen(&mut h.host, &[EventKind::PointerMove, EventKind::PointerLeave]);
    res.interval(&mut h.scheduler, 30.0, 0);
    res.timeout(&mut h.scheduler, 500.0, 1);
    res.request_frame(&mut h.scheduler);
    assert_eq!(res.listener_count(), 2);
    assert_eq!(res.timer_count(), 2);

    res.release(&mut h.host, &mut h.scheduler);
    assert_eq!(res.listener_count(), 0);
    assert_eq!(res.timer_count(), 0);
    assert_eq!(h.host.listeners().active(EffectKind::Trail), 0);
    assert_eq!(h.scheduler.active_timers(EffectKind::Trail), 0);
    assert!(!h.scheduler.has_frame_request(EffectKind::Trail));

    let timers = h.scheduler.counters(EffectKind::Trail);
    assert_eq!(timers.timers_created, timers.timers_released);
    assert_eq!(timers.frames_requested, timers.frames_released);
    let listeners = h.host.listeners().counters(EffectKind::Trail);
    assert_eq!(listeners.added, listeners.removed);
}

#[test]
fn settled_timers_are_not_cleared_twice() {
    let mut h = Harness::window(100.0, 100.0);
    let mut res = Resources::new(EffectKind::Click);
    let id = res.timeout(&mut h.scheduler, 10.0, 9);
    let fired = h.scheduler.pop_due(10.0).unwrap();
    assert_eq!(fired.id, id);
    res.settle(id);
    res.release(&mut h.host, &mut h.scheduler);
    let c = h.scheduler.counters(EffectKind::Click);
    assert_eq!((c.timers_created, c.timers_released), (1, 1));
}

#[test]
fn effect_layers_stack_in_paint_order() {
    let zs: Vec<i32> = EffectKind::ALL.iter().map(|&k| layer_z(k)).collect();
    assert!(zs.windows(2).all(|w| w[0] < w[1]));
}
