use glam::IVec2;
use reel::{
    Clock, MouseAdapter, PointerKind, Reel, ReelEvent, ReelId, ReelOptions, RotationConfig,
    TouchAdapter, TouchPhase, Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

// ── Helpers ──────────────────────────────────────────────────────

fn make_reel(id: u64, options: &ReelOptions) -> Rc<RefCell<Reel>> {
    let config = RotationConfig::resolve(options, Viewport::new(100, 80));
    Rc::new(RefCell::new(Reel::new(ReelId(id), config)))
}

fn attach(clock: &mut Clock, reel: &Rc<RefCell<Reel>>) {
    let id = reel.borrow().id();
    let handle = reel.clone();
    clock.subscribe(id, move || handle.borrow_mut().tick());
}

fn tick_period(clock: &Clock, ticks: u32) -> Duration {
    clock.period() * ticks
}

// ── Autoplay ─────────────────────────────────────────────────────

#[test]
fn test_autoplay_starts_after_delay() {
    let options = ReelOptions::default();
    let mut clock = Clock::new(options.tempo);
    let reel = make_reel(1, &options);
    attach(&mut clock, &reel);

    // delay 1s @ 25 ticks/s：前 24 个 tick 不动
    for _ in 0..24 {
        clock.tick();
    }
    assert_eq!(reel.borrow().fraction(), 0.0);

    clock.tick();
    assert!((reel.borrow().fraction() - 0.01).abs() < 1e-12);

    clock.tick();
    assert!((reel.borrow().fraction() - 0.02).abs() < 1e-12);
}

#[test]
fn test_interaction_postpones_autoplay() {
    let options = ReelOptions {
        delay: 0.0,
        timeout: 0.4,
        tempo: 10.0,
        ..Default::default()
    };
    let mut clock = Clock::new(options.tempo);
    let reel = make_reel(1, &options);
    attach(&mut clock, &reel);

    clock.tick();
    let moved = reel.borrow().fraction();
    assert!(moved > 0.0);

    reel.borrow_mut().wheel(3.0);
    assert_eq!(reel.borrow().state().idle_ticks, -4);

    for _ in 0..3 {
        clock.tick();
    }
    assert_eq!(reel.borrow().fraction(), moved);

    clock.tick();
    assert!(reel.borrow().fraction() > moved);
}

#[test]
fn test_animate_off_skips_start_delay() {
    let options = ReelOptions {
        animate: false,
        ..Default::default()
    };
    let reel = make_reel(1, &options);
    let mut r = reel.borrow_mut();
    assert_eq!(r.state().idle_ticks, 0);

    r.tick();
    assert!((r.fraction() - 0.01).abs() < 1e-12);

    // 交互后照常等待 timeout
    r.wheel(1.0);
    r.tick();
    assert!((r.fraction() - 0.01).abs() < 1e-12);
}

#[test]
fn test_autoplay_follows_drag_direction() {
    let options = ReelOptions {
        delay: 0.0,
        timeout: 0.0,
        ..Default::default()
    };
    let reel = make_reel(1, &options);
    let mut r = reel.borrow_mut();
    r.set_fraction(0.5);

    // 向左拖：fraction 变小，方向变为逆向
    r.down(100.0, PointerKind::Mouse);
    r.drag(80.0);
    r.up();
    assert!(r.state().reversed);
    let after_drag = r.fraction();

    r.tick();
    assert!(r.fraction() < after_drag);
}

#[test]
fn test_autoplay_wraps_through_the_end() {
    let options = ReelOptions {
        delay: 0.0,
        frequency: 0.25,
        ..Default::default()
    };
    let reel = make_reel(1, &options);
    let mut r = reel.borrow_mut();
    r.set_fraction(0.995);

    r.tick(); // 1.005 -> 夹到 1
    assert_eq!(r.fraction(), 1.0);
    r.tick(); // 再次越过端点 -> 反射到 0
    assert_eq!(r.fraction(), 0.0);
    r.tick();
    assert!((r.fraction() - 0.01).abs() < 1e-12);
}

#[test]
fn test_autoplay_stops_at_end_without_loops() {
    let options = ReelOptions {
        delay: 0.0,
        loops: false,
        ..Default::default()
    };
    let reel = make_reel(1, &options);
    let mut r = reel.borrow_mut();
    r.set_fraction(0.995);

    for _ in 0..10 {
        r.tick();
    }
    assert_eq!(r.fraction(), 1.0);
    assert_eq!(r.frame(), 36);
}

// ── Shared clock ─────────────────────────────────────────────────

#[test]
fn test_clock_drives_every_reel() {
    let options = ReelOptions {
        delay: 0.0,
        ..Default::default()
    };
    let mut clock = Clock::new(25.0);
    let a = make_reel(1, &options);
    let b = make_reel(2, &ReelOptions {
        delay: 0.0,
        frequency: -0.25,
        ..Default::default()
    });
    attach(&mut clock, &a);
    attach(&mut clock, &b);

    assert_eq!(clock.advance(tick_period(&clock, 3)), 3);
    assert!((a.borrow().fraction() - 0.03).abs() < 1e-12);
    // b 从 0 逆向起步，先反射到 1 再往回走
    assert!((b.borrow().fraction() - 0.98).abs() < 1e-12);

    // 拆掉 a 之后只剩 b 在转
    clock.unsubscribe(a.borrow().id());
    clock.advance(tick_period(&clock, 1));
    assert!((a.borrow().fraction() - 0.03).abs() < 1e-12);
    assert!((b.borrow().fraction() - 0.97).abs() < 1e-12);

    clock.unsubscribe(b.borrow().id());
    assert!(!clock.is_running());
    assert_eq!(Rc::strong_count(&a), 1);
    assert_eq!(Rc::strong_count(&b), 1);
}

#[test]
fn test_clock_holds_while_dragging() {
    let options = ReelOptions {
        delay: 0.0,
        ..Default::default()
    };
    let mut clock = Clock::new(25.0);
    let reel = make_reel(1, &options);
    attach(&mut clock, &reel);

    reel.borrow_mut().down(0.0, PointerKind::Mouse);
    clock.advance(Duration::from_secs(2));
    assert_eq!(reel.borrow().fraction(), 0.0);
}

// ── Pointer adapters ─────────────────────────────────────────────

#[test]
fn test_mouse_drag_full_revolution() {
    let reel = make_reel(1, &ReelOptions::default());
    let mut mouse = MouseAdapter::new();
    let mut r = reel.borrow_mut();

    mouse.cursor_moved(10.0, &mut *r);
    mouse.button(true, &mut *r);
    // revolution = 2 * viewport width = 200px；拖 50px 转四分之一圈
    mouse.cursor_moved(60.0, &mut *r);
    assert!((r.fraction() - 0.25).abs() < 1e-12);
    assert_eq!(r.frame(), 10);
    mouse.button(false, &mut *r);

    // 松开后移动不再影响
    mouse.cursor_moved(150.0, &mut *r);
    assert!((r.fraction() - 0.25).abs() < 1e-12);
}

#[test]
fn test_touch_drag_on_strip() {
    let options = ReelOptions {
        stitched: Some(3600.0),
        loops: false,
        ..Default::default()
    };
    let reel = make_reel(1, &options);
    let mut touch = TouchAdapter::new();
    let mut r = reel.borrow_mut();

    // 全景条方向相反：手指向左拖 450px = 四分之一圈（revolution 1800）
    touch.touch(9, TouchPhase::Started, 500.0, &mut *r);
    touch.touch(9, TouchPhase::Moved, 50.0, &mut *r);
    assert!((r.fraction() - 0.25).abs() < 1e-12);
    assert_eq!(r.state().drag_anchor.map(|a| a.kind), Some(PointerKind::Touch));

    let p = r.projection();
    assert_eq!(p.frame, 10);
    // travel = 3600 - 100, step = 3500 / 36, 9 步
    assert_eq!(p.offset, IVec2::new(-875, 0));

    touch.touch(9, TouchPhase::Ended, 50.0, &mut *r);
    assert!(!r.state().is_dragging());
}

// ── Projection & notifications ───────────────────────────────────

#[test]
fn test_projection_tracks_frame_changes() {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let sink = frames.clone();

    let reel = make_reel(1, &ReelOptions::default());
    let mut r = reel.borrow_mut();
    r.on_change(move |e| {
        if let ReelEvent::FrameChange(f) = e {
            sink.borrow_mut().push(*f);
        }
    });

    r.set_frame(7);
    assert_eq!(r.projection().offset, IVec2::new(0, -80));
    // 往回退：逆向时取精灵图下半部分的那组帧
    r.set_frame(2);
    assert!(r.state().reversed);
    assert_eq!(r.projection().offset, IVec2::new(-100, -6 * 80));

    assert_eq!(*frames.borrow(), vec![1, 7, 2]);
}

#[test]
fn test_options_file_round_trip() {
    let json = r#"{
        "frames": 24,
        "footage": 8,
        "horizontal": false,
        "frame": 5,
        "indicator": 10,
        "monitor": "frame"
    }"#;
    let options = ReelOptions::from_json_str(json).unwrap();
    let viewport = Viewport::infer(&options, 300, 640);
    assert_eq!(viewport, Viewport::new(100, 80));

    let reel = Reel::new(ReelId(3), RotationConfig::resolve(&options, viewport));
    assert_eq!(reel.frame(), 5);
    assert_eq!(reel.state().monitor("frame").as_deref(), Some("4.83"));

    let p = reel.projection();
    // 竖排：第 5 帧在第一列第 5 行
    assert_eq!(p.offset, IVec2::new(0, -4 * 80));
    assert!((p.indicator_x - 4.0 / 24.0 * 90.0).abs() < 1e-9);
}
