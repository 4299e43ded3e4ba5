//! Frame driver: input handling, cache reconciliation and drawing.

use std::path::PathBuf;
use std::time::Duration;

use egui::{Color32, Context, FontId, Key, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use log::{error, info, warn};

use crate::cache::PageCache;
use crate::document::{PageImage, Pdf};
use crate::reload::{self, ReloadNotice, TARGET_FPS};
use crate::viewport::{Viewport, ZOOM_STEP};

const OVERLAY_FONT_SIZE: f32 = 20.0;
const OVERLAY_PADDING: f32 = 5.0;
/// Idle heartbeat so a pending reload signal is noticed without input.
const IDLE_REPAINT: Duration = Duration::from_millis(200);

const DIGIT_KEYS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

/// Input gathered from the backend for one frame.
#[derive(Default)]
struct FrameInput {
    quit: bool,
    zoom_delta: f32,
    page_step: i32,
    decile: Option<u32>,
    wheel: f32,
}

/// The viewer session: one document, its texture cache and the viewport.
pub struct ViewerApp {
    path: PathBuf,
    doc: Option<Pdf>,
    cache: PageCache,
    viewport: Viewport,
    notice: Option<ReloadNotice>,
    last_size: Vec2,
}

impl ViewerApp {
    /// Open the document and build an empty cache for it. An unreadable
    /// or unparsable document leaves a zero-page session; the window
    /// still runs.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let doc = match Pdf::open(&path) {
            Ok(doc) => {
                info!("opened {} ({} pages)", path.display(), doc.page_count());
                Some(doc)
            }
            Err(err) => {
                error!("failed to open {}: {err}", path.display());
                None
            }
        };

        let page_count = doc.as_ref().map_or(0, Pdf::page_count);
        Self {
            path,
            doc,
            cache: PageCache::new(page_count),
            viewport: Viewport::new(),
            notice: None,
            last_size: Vec2::ZERO,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.doc.as_ref().map_or(0, Pdf::page_count)
    }

    /// Rebuild the document and cache from disk, keeping scroll and zoom.
    /// When the re-open fails the previous document stays in place and no
    /// notice is shown.
    fn reload_from_disk(&mut self, window_width: f32) {
        match Pdf::open(&self.path) {
            Ok(doc) => {
                info!("reloaded {} ({} pages)", self.path.display(), doc.page_count());
                self.cache.reset(doc.page_count());
                self.viewport
                    .recompute_page_height(window_width, doc.aspect_ratio());
                // The old document is dropped only once the new one is
                // fully built; a failed open leaves it in place.
                self.doc = Some(doc);
                self.notice = Some(ReloadNotice::new());
            }
            Err(err) => {
                error!(
                    "reload of {} failed, keeping current document: {err}",
                    self.path.display()
                );
            }
        }
    }

    /// Zoom or resize: every rendered pixel size is stale.
    fn invalidate(&mut self, window_width: f32) {
        self.cache.invalidate_all();
        if let Some(doc) = &self.doc {
            self.viewport
                .recompute_page_height(window_width, doc.aspect_ratio());
        }
    }

    fn handle_input(&mut self, ctx: &Context, window: Rect) {
        let mut input = FrameInput::default();

        ctx.input(|i| {
            input.quit = i.key_pressed(Key::Q);
            if i.key_pressed(Key::Plus) || i.key_pressed(Key::Equals) {
                input.zoom_delta += ZOOM_STEP;
            }
            if i.key_pressed(Key::Minus) {
                input.zoom_delta -= ZOOM_STEP;
            }
            if i.key_pressed(Key::ArrowUp) || i.key_pressed(Key::ArrowLeft) {
                input.page_step -= 1;
            }
            if i.key_pressed(Key::ArrowDown) || i.key_pressed(Key::ArrowRight) {
                input.page_step += 1;
            }
            for (n, key) in DIGIT_KEYS.iter().enumerate() {
                if i.key_pressed(*key) {
                    input.decile = Some(n as u32);
                }
            }
            input.wheel = i.raw_scroll_delta.y;
        });

        if input.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if input.wheel != 0.0 {
            self.viewport.scroll_wheel(input.wheel);
        }
        if input.page_step != 0 {
            self.viewport.scroll_pages(input.page_step);
        }
        if let Some(n) = input.decile {
            self.viewport.jump_to_decile(n, self.page_count());
        }
        if input.zoom_delta != 0.0 && self.viewport.zoom_by(input.zoom_delta) {
            self.invalidate(window.width());
        }

        self.viewport.clamp(window.height(), self.page_count());
    }

    fn paint(&mut self, ui: &egui::Ui, ctx: &Context, window: Rect) {
        let painter = ui.painter();
        let page_count = self.page_count();
        let page_height = self.viewport.page_height();

        let mut first_visible = 0;
        if let Some((first, last)) = self.viewport.visible_range(window.height(), page_count) {
            first_visible = first;

            if let Some(doc) = &self.doc {
                let window_width = window.width();
                let zoom = self.viewport.zoom;
                self.cache.ensure_visible(first..=last, |page| {
                    render_texture(ctx, doc, page, window_width, zoom)
                });
            }

            let expected_width = (window.width() * self.viewport.zoom).max(1.0);
            let first_width = self
                .cache
                .texture(first)
                .map_or(expected_width, |t| t.size()[0] as f32);
            let x = (window.width() - first_width) / 2.0;
            let y0 = ((-(self.viewport.scroll * page_height as f32) as i32)
                % page_height as i32) as f32;

            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            for page in first..=last {
                // Skip pages the cache has never managed to render.
                let Some(texture) = self.cache.texture(page) else {
                    continue;
                };
                let row = (page - first) as f32;
                let pos = Pos2::new(x, y0 + row * page_height as f32);
                let rect = Rect::from_min_size(pos, texture.size_vec2());
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
        }

        // Page indicator, top-left.
        let page_text = format!("page {}/{}", first_visible + 1, page_count);
        let galley = painter.layout_no_wrap(
            page_text,
            FontId::proportional(OVERLAY_FONT_SIZE),
            Color32::WHITE,
        );
        let box_size = galley.size() + Vec2::splat(2.0 * OVERLAY_PADDING);
        painter.rect_filled(Rect::from_min_size(window.min, box_size), 0.0, Color32::BLACK);
        painter.galley(
            window.min + Vec2::splat(OVERLAY_PADDING),
            galley,
            Color32::WHITE,
        );

        // Transient reload notice, bottom-right.
        if self.notice.is_some() {
            let galley = painter.layout_no_wrap(
                "document reloaded".to_owned(),
                FontId::proportional(OVERLAY_FONT_SIZE),
                Color32::GREEN,
            );
            let box_size = galley.size() + Vec2::splat(2.0 * OVERLAY_PADDING);
            let min = window.max - box_size;
            painter.rect_filled(Rect::from_min_size(min, box_size), 0.0, Color32::BLACK);
            painter.galley(min + Vec2::splat(OVERLAY_PADDING), galley, Color32::GREEN);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let window = ctx.screen_rect();

        // Signal flag first, then resize, then input, then reconciliation
        // and drawing. All mutation happens in this order, once per tick.
        if reload::take_reload_request() {
            self.reload_from_disk(window.width());
        }

        if window.size() != self.last_size {
            self.last_size = window.size();
            self.invalidate(window.width());
        }

        self.handle_input(ctx, window);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::BLACK))
            .show(ctx, |ui| {
                self.paint(ui, ctx, window);
            });

        // An active notice must keep animating without input; otherwise a
        // coarse heartbeat is enough to observe the reload flag.
        if let Some(notice) = &mut self.notice {
            if notice.tick() {
                ctx.request_repaint_after(Duration::from_millis(u64::from(1000 / TARGET_FPS)));
                return;
            }
            self.notice = None;
        }
        ctx.request_repaint_after(IDLE_REPAINT);
    }
}

fn render_texture(
    ctx: &Context,
    doc: &Pdf,
    page: usize,
    window_width: f32,
    zoom: f32,
) -> Option<TextureHandle> {
    let (page_w, page_h) = match doc.page_extent(page) {
        Ok(extent) => extent,
        Err(err) => {
            warn!("failed to measure page {page}: {err}");
            return None;
        }
    };

    let target_w = (window_width * zoom).max(1.0) as u32;
    let target_h = (target_w as f32 * page_h / page_w).max(1.0) as u32;

    match doc.render(page, target_w, target_h) {
        Ok(image) => Some(upload(ctx, page, &image)),
        Err(err) => {
            warn!("failed to render page {page}: {err}");
            None
        }
    }
}

fn upload(ctx: &Context, page: usize, image: &PageImage) -> TextureHandle {
    let color_image = egui::ColorImage::from_rgb(
        [image.width as usize, image.height as usize],
        &image.pixels,
    );
    ctx.load_texture(format!("page_{page}"), color_image, TextureOptions::LINEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::blank_pdf;
    use std::io::{Seek, SeekFrom, Write};
    use tempfile::NamedTempFile;

    fn rewrite(file: &mut NamedTempFile, bytes: &[u8]) {
        let f = file.as_file_mut();
        f.seek(SeekFrom::Start(0)).expect("rewind");
        f.set_len(0).expect("truncate");
        f.write_all(bytes).expect("rewrite");
        f.flush().expect("flush");
    }

    fn pdf_file(pages: usize) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("create temp pdf");
        file.write_all(&blank_pdf(pages)).expect("write temp pdf");
        file.flush().expect("flush temp pdf");
        file
    }

    #[test]
    fn session_opens_with_empty_slots_per_page() {
        let file = pdf_file(10);
        let app = ViewerApp::new(file.path().to_path_buf());

        assert_eq!(app.page_count(), 10);
        assert_eq!(app.cache.len(), 10);
        assert!(!app.cache.is_current(0));
    }

    #[test]
    fn unreadable_document_yields_zero_page_session() {
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("create temp file");
        file.write_all(b"this is not a pdf").expect("write garbage");
        file.flush().expect("flush");

        let app = ViewerApp::new(file.path().to_path_buf());

        assert_eq!(app.page_count(), 0);
        assert!(app.cache.is_empty());
    }

    #[test]
    fn reload_preserves_scroll_and_zoom_and_bumps_generation() {
        let file = pdf_file(10);
        let mut app = ViewerApp::new(file.path().to_path_buf());
        app.viewport.scroll = 4.2;
        app.viewport.zoom = 1.3;
        let generation = app.cache.generation();

        app.reload_from_disk(800.0);

        assert_eq!(app.viewport.scroll, 4.2);
        assert_eq!(app.viewport.zoom, 1.3);
        assert_eq!(app.page_count(), 10);
        assert_eq!(app.cache.generation(), generation + 1);
        assert!(app.notice.is_some_and(|n| n.active()));
    }

    #[test]
    fn resize_invalidation_bumps_generation_and_recomputes_height() {
        let file = pdf_file(2);
        let mut app = ViewerApp::new(file.path().to_path_buf());
        let generation = app.cache.generation();

        app.invalidate(800.0);

        assert_eq!(app.cache.generation(), generation + 1);
        assert!(app.viewport.page_height() > 1);
    }

    #[test]
    fn failed_reload_keeps_previous_document() {
        let mut file = pdf_file(10);
        let mut app = ViewerApp::new(file.path().to_path_buf());
        let generation = app.cache.generation();

        // Clobber the file on disk, then ask for a reload.
        rewrite(&mut file, b"garbage");
        app.reload_from_disk(800.0);

        assert_eq!(app.page_count(), 10);
        assert_eq!(app.cache.generation(), generation);
        assert!(app.notice.is_none());
    }

    #[test]
    fn reload_adopts_new_page_count() {
        let mut file = pdf_file(10);
        let mut app = ViewerApp::new(file.path().to_path_buf());

        rewrite(&mut file, &blank_pdf(3));
        app.reload_from_disk(800.0);

        assert_eq!(app.page_count(), 3);
        assert_eq!(app.cache.len(), 3);
    }
}
