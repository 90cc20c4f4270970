// main.rs：转盘查看器，窗口、输入采集与界面

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod i18n;
mod renderer;

use clap::Parser;
use reel::{
    Clock, MouseAdapter, PointerKind, PointerSession, Reel, ReelError, ReelId, ReelOptions,
    RotationConfig, TouchAdapter, TouchPhase, Viewport,
};
use renderer::Renderer;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "reel_viewer")]
#[command(about = "Spin a sprite sheet or stitched panorama like a turntable")]
struct Cli {
    /// Image to open; `A.jpg` loads `A-reel.jpg` when that sprite exists
    image: Option<PathBuf>,

    /// JSON file with reel options
    #[arg(long)]
    options: Option<PathBuf>,

    /// UI language (en, zh-Hans); falls back to REEL_LANG
    #[arg(long)]
    lang: Option<String>,

    #[arg(long)]
    frames: Option<i64>,

    #[arg(long)]
    footage: Option<i64>,

    #[arg(long)]
    steps: Option<i64>,

    /// Pixel length of a stitched panorama (switches to strip mode)
    #[arg(long)]
    stitched: Option<f64>,

    /// Autoplay speed in Hz; negative spins backward
    #[arg(long, allow_negative_numbers = true)]
    frequency: Option<f64>,

    /// Shared clock rate in ticks per second
    #[arg(long)]
    tempo: Option<f64>,

    /// Stop at the ends instead of wrapping around
    #[arg(long)]
    no_loops: bool,

    /// Frames run down columns instead of along rows
    #[arg(long)]
    vertical: bool,
}

impl Cli {
    fn reel_options(&self) -> ReelOptions {
        let mut options = match &self.options {
            Some(path) => ReelOptions::from_json_file(path).unwrap_or_else(|e| {
                log::error!(
                    "{}",
                    i18n::tr_with("error.options", &[("err", e.to_string())])
                );
                ReelOptions::default()
            }),
            None => ReelOptions::default(),
        };

        if let Some(v) = self.frames {
            options.frames = v;
        }
        if let Some(v) = self.footage {
            options.footage = v;
        }
        if self.steps.is_some() {
            options.steps = self.steps;
        }
        if self.stitched.is_some() {
            options.stitched = self.stitched;
        }
        if let Some(v) = self.frequency {
            options.frequency = v;
        }
        if let Some(v) = self.tempo {
            options.tempo = v;
        }
        if self.no_loops {
            options.loops = false;
        }
        if self.vertical {
            options.horizontal = false;
        }
        options
    }
}

/// 后台线程解码好的精灵图
struct LoadedSheet {
    path: PathBuf,
    image: image::RgbaImage,
}

/// 当前挂载的转盘；时钟回调持有同一个 Rc
struct Turntable {
    reel: Rc<RefCell<Reel>>,
    path: PathBuf,
    sheet_size: (u32, u32),
}

/// 没有转盘时只记录光标，不做任何事
struct Detached;

impl PointerSession for Detached {
    fn begin(&mut self, _x: f64, _kind: PointerKind) {}
    fn move_to(&mut self, _x: f64) {}
    fn end(&mut self) {}
}

struct ViewerState {
    show_fps: bool,
    is_loading: bool,
    is_fullscreen: bool,
    fps: f32,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut current_lang = i18n::resolve_lang(cli.lang.as_deref());
    i18n::init(current_lang.clone());

    let mut options = cli.reel_options();

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(960, 720))
            .build(&event_loop)
            .expect("failed to create window"),
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()));

    let mut clock = Clock::new(options.tempo);
    let mut next_id = 0u64;
    let mut turntable: Option<Turntable> = None;

    let mut mouse = MouseAdapter::new();
    let mut touch = TouchAdapter::new();

    let mut viewer = ViewerState {
        show_fps: false,
        is_loading: false,
        is_fullscreen: false,
        fps: 0.0,
    };
    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;
    let mut last_tick = Instant::now();

    let (tx, rx): (Sender<LoadedSheet>, Receiver<LoadedSheet>) = channel();
    if let Some(path) = cli.image.clone() {
        viewer.is_loading = true;
        start_load_image(path, options.suffix.clone(), tx.clone());
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(sheet) = rx.try_recv() {
            let size = sheet.image.dimensions();
            renderer.load_sheet(sheet.image);
            if let Some(old) = turntable.take() {
                unmount(&mut clock, &old);
            }
            turntable = Some(mount(&mut clock, &mut next_id, &options, sheet.path, size));
            viewer.is_loading = false;
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                let scale = turntable
                    .as_ref()
                    .map(|t| display_scale(renderer.size, t.reel.borrow().config().viewport))
                    .unwrap_or(1.0);

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_image() {
                                        viewer.is_loading = true;
                                        start_load_image(path, options.suffix.clone(), tx.clone());
                                    }
                                }
                                Some(VirtualKeyCode::Home) => {
                                    if let Some(t) = &turntable {
                                        t.reel.borrow_mut().reset();
                                    }
                                }
                                Some(VirtualKeyCode::F11) => {
                                    toggle_fullscreen(&window, &mut viewer.is_fullscreen);
                                }
                                _ => {}
                            }
                        }
                    }

                    // 指针坐标换算到精灵图像素，拖拽距离才和 revolution 同一量纲
                    WindowEvent::CursorMoved { position, .. } => {
                        let x = position.x / scale;
                        match &turntable {
                            Some(t) => mouse.cursor_moved(x, &mut *t.reel.borrow_mut()),
                            None => mouse.cursor_moved(x, &mut Detached),
                        }
                    }

                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            let pressed = state == ElementState::Pressed;
                            match &turntable {
                                Some(t) => mouse.button(pressed, &mut *t.reel.borrow_mut()),
                                None => mouse.button(pressed, &mut Detached),
                            }
                        }
                    }

                    WindowEvent::Touch(t) => {
                        let phase = match t.phase {
                            winit::event::TouchPhase::Started => TouchPhase::Started,
                            winit::event::TouchPhase::Moved => TouchPhase::Moved,
                            winit::event::TouchPhase::Ended => TouchPhase::Ended,
                            winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
                        };
                        if let Some(table) = &turntable {
                            touch.touch(t.id, phase, t.location.x / scale, &mut *table.reel.borrow_mut());
                        }
                    }

                    // 滚轮只算一次交互，不转动
                    WindowEvent::MouseWheel { delta, .. } => {
                        let delta = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y as f64,
                            MouseScrollDelta::PixelDelta(pos) => pos.y,
                        };
                        if let Some(t) = &turntable {
                            t.reel.borrow_mut().wheel(delta);
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        viewer.is_loading = true;
                        start_load_image(path, options.suffix.clone(), tx.clone());
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                frame_count += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last_frame_time).as_secs_f32();
                if elapsed >= 1.0 {
                    viewer.fps = frame_count as f32 / elapsed;
                    frame_count = 0;
                    last_frame_time = now;
                }

                if let Some(t) = &turntable {
                    let reel = t.reel.borrow();
                    let config = reel.config();
                    renderer.update_sprite(
                        &reel.projection(),
                        config.viewport,
                        config.indicator,
                        config.is_stitched() && config.loops,
                    );
                }

                let mut action = None;
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    action = draw_ui(
                        ctx,
                        &mut viewer,
                        turntable.as_ref(),
                        &options,
                        &window,
                        &mut current_lang,
                    );
                });

                match action {
                    Some(UiAction::OpenImage(path)) => {
                        viewer.is_loading = true;
                        start_load_image(path, options.suffix.clone(), tx.clone());
                    }
                    Some(UiAction::LoadOptions(path)) => match ReelOptions::from_json_file(&path) {
                        Ok(loaded) => {
                            options = loaded;
                            clock.set_tempo(options.tempo);
                            if let Some(old) = turntable.take() {
                                unmount(&mut clock, &old);
                                turntable = Some(mount(
                                    &mut clock,
                                    &mut next_id,
                                    &options,
                                    old.path.clone(),
                                    old.sheet_size,
                                ));
                            }
                        }
                        Err(e) => log_load_error(&e),
                    },
                    Some(UiAction::Reset) => {
                        if let Some(t) = &turntable {
                            t.reel.borrow_mut().reset();
                        }
                    }
                    None => {}
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                let now = Instant::now();
                clock.advance(now.duration_since(last_tick));
                last_tick = now;
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn mount(
    clock: &mut Clock,
    next_id: &mut u64,
    options: &ReelOptions,
    path: PathBuf,
    sheet_size: (u32, u32),
) -> Turntable {
    let viewport = Viewport::infer(options, sheet_size.0, sheet_size.1);
    let config = RotationConfig::resolve(options, viewport);

    *next_id += 1;
    let id = ReelId(*next_id);
    let reel = Rc::new(RefCell::new(Reel::new(id, config)));
    reel.borrow_mut().on_change(move |event| log::trace!("{} {:?}", id, event));

    let handle = reel.clone();
    clock.set_tempo(options.tempo);
    clock.subscribe(id, move || handle.borrow_mut().tick());

    log::info!(
        "{}",
        i18n::tr_with(
            "log.reel_mounted",
            &[
                ("path", format!("{:?}", path)),
                ("w", viewport.width.to_string()),
                ("h", viewport.height.to_string()),
            ]
        )
    );

    Turntable {
        reel,
        path,
        sheet_size,
    }
}

fn unmount(clock: &mut Clock, turntable: &Turntable) {
    let id = turntable.reel.borrow().id();
    clock.unsubscribe(id);
}

/// 视口在窗口里的缩放比例（与 shader 的 letterbox 一致）
fn display_scale(window: winit::dpi::PhysicalSize<u32>, viewport: Viewport) -> f64 {
    let sx = window.width as f64 / viewport.width as f64;
    let sy = window.height as f64 / viewport.height as f64;
    let scale = sx.min(sy);
    if scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn toggle_fullscreen(window: &winit::window::Window, is_fullscreen: &mut bool) {
    *is_fullscreen = !*is_fullscreen;
    if *is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.images"), &["jpg", "jpeg", "png", "gif", "bmp"])
        .pick_file()
}

fn log_load_error(e: &ReelError) {
    let key = match e {
        ReelError::ReadOptions { .. } | ReelError::ParseOptions(_) => "error.options",
        ReelError::OpenImage { .. } => "error.open_file",
        ReelError::DecodeImage(_) => "error.decode_image",
    };
    log::error!("{}", i18n::tr_with(key, &[("err", e.to_string())]));
}

fn start_load_image(path: PathBuf, suffix: String, tx: Sender<LoadedSheet>) {
    thread::spawn(move || {
        let sprite = reel::sprite::resolve_sprite(&path, &suffix);
        log::info!(
            "{}",
            i18n::tr_with("log.loading_image_bg", &[("path", format!("{:?}", sprite))])
        );

        match reel::sprite::load_sprite(&sprite) {
            Ok(image) => {
                let (w, h) = image.dimensions();
                log::info!(
                    "{}",
                    i18n::tr_with(
                        "log.image_loaded_size",
                        &[("w", w.to_string()), ("h", h.to_string())]
                    )
                );
                if tx.send(LoadedSheet { path, image }).is_err() {
                    log::error!("{}", i18n::tr("error.send_to_main_failed"));
                }
            }
            Err(e) => log_load_error(&e),
        }
    });
}

enum UiAction {
    OpenImage(PathBuf),
    LoadOptions(PathBuf),
    Reset,
}

fn draw_ui(
    ctx: &egui::Context,
    viewer: &mut ViewerState,
    turntable: Option<&Turntable>,
    options: &ReelOptions,
    window: &winit::window::Window,
    current_lang: &mut String,
) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(&i18n::tr("menu.file"), |ui| {
                if ui.button(&i18n::tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    action = pick_image().map(UiAction::OpenImage);
                }
                if ui.button(&i18n::tr("menu.open_options")).clicked() {
                    ui.close_menu();
                    action = rfd::FileDialog::new()
                        .add_filter(&i18n::tr("file.filter.options"), &["json"])
                        .pick_file()
                        .map(UiAction::LoadOptions);
                }
                if ui.button(&i18n::tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            ui.menu_button(&i18n::tr("menu.view"), |ui| {
                if ui.button(&i18n::tr("view.reset")).clicked() {
                    action = Some(UiAction::Reset);
                    ui.close_menu();
                }

                let fullscreen_label = if viewer.is_fullscreen {
                    i18n::tr("view.fullscreen.exit")
                } else {
                    i18n::tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    toggle_fullscreen(window, &mut viewer.is_fullscreen);
                    ui.close_menu();
                }

                ui.separator();
                if ui
                    .checkbox(&mut viewer.show_fps, i18n::tr("view.show_fps"))
                    .clicked()
                {
                    ui.close_menu();
                }
            });

            ui.menu_button(&i18n::tr("menu.language"), |ui| {
                let langs: [(&str, &str); 2] = [("zh-Hans", "简体中文"), ("en", "English")];
                for (code, name) in langs {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        i18n::init(current_lang.clone());
                        window.set_title(&i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if viewer.is_loading {
                ui.label(
                    egui::RichText::new(i18n::tr("status.loading_image"))
                        .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }

            let Some(t) = turntable else {
                ui.label(i18n::tr("status.no_image"));
                return;
            };
            let reel = t.reel.borrow();
            let config = reel.config();
            let state = reel.state();

            let mode = if config.is_stitched() {
                i18n::tr("status.mode.strip")
            } else {
                i18n::tr("status.mode.grid")
            };
            ui.label(format!("{} {}", i18n::tr("status.mode_prefix"), mode));
            ui.label("|");

            let frame_label = ui.label(format!(
                "{} {}/{}",
                i18n::tr("status.frame_prefix"),
                reel.frame(),
                config.frames
            ));
            if !options.hint.is_empty() {
                frame_label.on_hover_text(options.hint.as_str());
            }
            ui.label("|");
            ui.label(format!("{:.3}", state.fraction));
            ui.label("|");
            ui.label(if state.reversed {
                i18n::tr("status.direction.reversed")
            } else {
                i18n::tr("status.direction.forward")
            });
            ui.label("|");
            ui.label(if state.is_dragging() {
                i18n::tr("status.dragging")
            } else if state.idle_ticks == 0 {
                i18n::tr("status.autoplay")
            } else {
                i18n::tr("status.waiting")
            });

            if let Some(field) = &options.monitor {
                ui.label("|");
                let value = state.monitor(field).unwrap_or_else(|| "?".to_string());
                ui.label(format!("{}: {}", field, value));
            }

            if viewer.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", viewer.fps))
                        .color(egui::Color32::GREEN),
                );
            }
        });
    });

    action
}
