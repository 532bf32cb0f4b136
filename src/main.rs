mod arrange;
mod collision;
mod constants;
mod epic;
mod epic_store;
mod error;
mod geometry;
mod interaction;
mod paths;
mod persistence;
mod project;
mod render;
mod storage;

use constants::{
    COLOR_LOCK_ACTIVE, COLOR_TITLE_PLACEHOLDER, COLOR_TOOLBAR_BG, DEFAULT_PAGE_TITLE,
    EXPORT_EXTENSION, EXPORT_FILE_NAME, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, ROW_COUNT,
    TITLE_FONT_SIZE, TOOLBAR_BUTTON_SIZE, TOOLBAR_ICON_SIZE, TOOLBAR_START_SPACING,
};
use eframe::egui::{self, Align2, Color32, CursorIcon, FontId, Pos2, Rect, RichText, Sense, Vec2};
use egui::vec2;
use epic::{parse_hex_color, palette_color, EpicId};
use geometry::GridSpec;
use interaction::{Gesture, Interaction};
use paths::AppPaths;
use project::Project;
use render::Hit;
use storage::{KeyValueStore, LocalStorage, MemoryStorage};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ganttris")
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        "Ganttris",
        options,
        Box::new(|cc| Ok(Box::new(GanttrisApp::new(cc)))),
    )
}

/// Opens the on-disk key-value store, falling back to memory when that is impossible.
fn open_storage() -> Box<dyn KeyValueStore> {
    let Some(paths) = AppPaths::from_project_dirs() else {
        log::warn!("no home directory found; the project will not be saved");
        return Box::new(MemoryStorage::new());
    };
    if let Err(err) = paths.ensure_dirs_exist() {
        log::error!("cannot create {}: {err}", paths.data.display());
        return Box::new(MemoryStorage::new());
    }
    match LocalStorage::open(&paths.storage_file) {
        Ok(storage) => {
            log::info!("saving project to {}", storage.path().display());
            Box::new(storage)
        }
        Err(err) => {
            log::error!("cannot open {}: {err}", paths.storage_file.display());
            Box::new(MemoryStorage::new())
        }
    }
}

struct RenameState {
    id: EpicId,
    buffer: String,
}

struct GanttrisApp {
    project: Project,
    interaction: Interaction,
    /// The toolbar epic is being dragged towards the timeline.
    toolbar_drag: bool,
    notice: Option<String>,
    rename: Option<RenameState>,
    title_buffer: String,
    last_revision: u64,
}

fn toolbar_button(ui: &mut egui::Ui, icon: &str, hover: &str) -> bool {
    ui.add(
        egui::Button::new(RichText::new(icon).size(TOOLBAR_ICON_SIZE))
            .min_size(Vec2::splat(TOOLBAR_BUTTON_SIZE))
            .frame(false),
    )
    .on_hover_text(hover)
    .clicked()
}

impl GanttrisApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let project = Project::load(GridSpec::default(), open_storage());
        Self {
            title_buffer: project.page_title().to_string(),
            last_revision: project.revision(),
            project,
            interaction: Interaction::new(),
            toolbar_drag: false,
            notice: None,
            rename: None,
        }
    }

    fn sync_title(&mut self) {
        self.title_buffer = self.project.page_title().to_string();
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::default()
                    .fill(COLOR_TOOLBAR_BG)
                    .inner_margin(4.0)
                    .outer_margin(0.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(TOOLBAR_START_SPACING);

                    let next_color = parse_hex_color(palette_color(self.project.epics().len()))
                        .unwrap_or(Color32::GRAY);
                    let epic_item = ui
                        .add(
                            egui::Button::new(
                                RichText::new("▭ Epic")
                                    .size(TOOLBAR_ICON_SIZE)
                                    .color(Color32::WHITE),
                            )
                            .fill(next_color)
                            .min_size(Vec2::splat(TOOLBAR_BUTTON_SIZE))
                            .sense(Sense::drag()),
                        )
                        .on_hover_text("Drag onto the timeline to add an epic");
                    if epic_item.drag_started() {
                        self.toolbar_drag = true;
                    }

                    ui.separator();
                    ui.label(RichText::new("Resources").color(Color32::LIGHT_GRAY));
                    let mut row = self.project.highlight_row();
                    if ui
                        .add(egui::DragValue::new(&mut row).range(1..=ROW_COUNT as u32))
                        .on_hover_text("Highlighted resource row, also the limit for arranging")
                        .changed()
                    {
                        self.project.set_highlight_row(row);
                    }

                    let locked = self.project.is_lock_area_enabled();
                    let lock_text = if locked { "🔒 Effort" } else { "🔓 Effort" };
                    let lock_button = egui::Button::new(RichText::new(lock_text).color(Color32::WHITE))
                        .min_size(vec2(0.0, TOOLBAR_BUTTON_SIZE))
                        .fill(if locked {
                            COLOR_LOCK_ACTIVE
                        } else {
                            Color32::from_gray(60)
                        });
                    if ui
                        .add(lock_button)
                        .on_hover_text("Keep sprints x resources constant while resizing")
                        .clicked()
                    {
                        self.project.toggle_lock_area();
                    }

                    ui.separator();
                    let has_epics = !self.project.store().is_empty();
                    ui.add_enabled_ui(has_epics, |ui| {
                        if toolbar_button(ui, "🧩", "Arrange Epics") {
                            if let Err(err) = self.project.arrange() {
                                self.notice = Some(err.user_message());
                            }
                        }
                        if toolbar_button(ui, "⬆", "Compact Vertically") {
                            if let Err(err) = self.project.compact_vertically() {
                                self.notice = Some(err.user_message());
                            }
                        }
                    });
                    if toolbar_button(ui, "🗑", "Clear Timeline") {
                        self.project.clear_timeline();
                        self.sync_title();
                    }

                    ui.separator();
                    if toolbar_button(ui, "💾", "Export Project") {
                        self.export_project();
                    }
                    if toolbar_button(ui, "📂", "Import Project") {
                        self.import_project();
                    }
                });
            });
    }

    fn show_title(&mut self, ui: &mut egui::Ui) {
        let color = if self.project.page_title() == DEFAULT_PAGE_TITLE {
            COLOR_TITLE_PLACEHOLDER
        } else {
            ui.visuals().strong_text_color()
        };
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.title_buffer)
                .font(FontId::proportional(TITLE_FONT_SIZE))
                .text_color(color)
                .frame(false)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.project.set_page_title(&self.title_buffer);
        }
        if response.lost_focus() {
            self.sync_title();
        }
    }

    fn show_timeline(&mut self, ui: &mut egui::Ui) {
        let scene = render::layout(&self.project);

        egui::ScrollArea::both()
            .id_salt("timeline")
            .drag_to_scroll(false)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (canvas_rect, response) =
                    ui.allocate_exact_size(scene.size, Sense::click_and_drag());
                let origin = canvas_rect.min;
                let to_timeline = |p: Pos2| (p - origin).to_pos2();

                self.handle_pointer(ui, &response, &scene, origin);
                self.handle_toolbar_drop(ui, canvas_rect, origin);

                // Mutations above are reflected in the same frame.
                let scene = render::layout(&self.project);
                let painter = ui.painter_at(canvas_rect);
                let hover = ui.input(|i| i.pointer.hover_pos());
                render::paint(&painter, &scene, origin, hover);

                if let Some(ghost) = self.interaction.ghost() {
                    let fill = self
                        .interaction
                        .active_epic()
                        .and_then(|id| self.project.epic(id))
                        .map(|e| e.fill_color())
                        .unwrap_or(Color32::GRAY);
                    render::paint_preview(&painter, ghost.translate(origin.to_vec2()), fill);
                }

                if self.toolbar_drag {
                    if let Some(pointer) = hover.filter(|p| canvas_rect.contains(*p)) {
                        let at = to_timeline(pointer);
                        let grid = self.project.grid();
                        let cell = Rect::from_min_size(
                            origin
                                + vec2(
                                    grid.column_left(grid.column_at(at.x)) as f32,
                                    grid.row_top(grid.row_at(at.y)) as f32,
                                ),
                            vec2(grid.sprint_width as f32, grid.row_height as f32),
                        );
                        let free = self.project.cell_is_free(at.x, at.y);
                        render::paint_drop_target(&painter, cell, free);
                    }
                }

                let cursor = match self.interaction.gesture() {
                    Gesture::Dragging { .. } => Some(CursorIcon::Grabbing),
                    Gesture::ResizingHorizontal { .. } => Some(CursorIcon::ResizeHorizontal),
                    Gesture::ResizingVertical { .. } => Some(CursorIcon::ResizeVertical),
                    Gesture::Idle => hover
                        .and_then(|p| render::hit_test(&scene, to_timeline(p)))
                        .and_then(|(_, hit)| match hit {
                            Hit::HorizontalHandle => Some(CursorIcon::ResizeHorizontal),
                            Hit::VerticalHandle => Some(CursorIcon::ResizeVertical),
                            Hit::Name => Some(CursorIcon::Text),
                            Hit::Star | Hit::Delete => Some(CursorIcon::PointingHand),
                            Hit::Body => Some(CursorIcon::Grab),
                        }),
                };
                if let Some(icon) = cursor {
                    ui.ctx().set_cursor_icon(icon);
                }
            });
    }

    fn handle_pointer(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        scene: &render::Scene,
        origin: Pos2,
    ) {
        let to_timeline = |p: Pos2| (p - origin).to_pos2();

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(press) = ui.input(|i| i.pointer.press_origin()) {
                let at = to_timeline(press);
                if let Some((id, region)) = render::hit_test(scene, at)
                    .and_then(|(id, hit)| hit.handle_region().map(|region| (id, region)))
                {
                    self.interaction.begin(&self.project, id, region, at);
                }
            }
        }

        if self.interaction.is_active() && response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.interaction
                    .pointer_moved(&mut self.project, to_timeline(pointer));
            }
        }

        let released = response.drag_stopped() || !ui.input(|i| i.pointer.primary_down());
        if self.interaction.is_active() && released {
            self.interaction.end(&mut self.project);
        }

        if response.clicked() {
            let Some(pointer) = response.interact_pointer_pos() else {
                return;
            };
            match render::hit_test(scene, to_timeline(pointer)) {
                Some((id, Hit::Star)) => {
                    if let Err(err) = self.project.toggle_star(id) {
                        log::debug!("star ignored: {err}");
                    }
                }
                Some((id, Hit::Delete)) => {
                    if let Err(err) = self.project.delete_epic(id) {
                        log::debug!("delete ignored: {err}");
                    }
                }
                Some((id, Hit::Name)) => {
                    if let Some(epic) = self.project.epic(id) {
                        self.rename = Some(RenameState {
                            id,
                            buffer: epic.name.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_toolbar_drop(&mut self, ui: &egui::Ui, canvas_rect: Rect, origin: Pos2) {
        if !self.toolbar_drag || !ui.input(|i| i.pointer.any_released()) {
            return;
        }
        self.toolbar_drag = false;
        let Some(pointer) = ui.input(|i| i.pointer.interact_pos()) else {
            return;
        };
        if !canvas_rect.contains(pointer) || !ui.clip_rect().contains(pointer) {
            return;
        }
        let at = pointer - origin;
        if let Err(err) = self.project.drop_epic(at.x, at.y) {
            log::info!("drop refused: {err}");
            self.notice = Some(err.user_message());
        }
    }

    fn paint_toolbar_drag_preview(&mut self, ctx: &egui::Context) {
        if !self.toolbar_drag {
            return;
        }
        if !ctx.input(|i| i.pointer.primary_down()) {
            self.toolbar_drag = false;
            return;
        }
        let Some(pointer) = ctx.input(|i| i.pointer.hover_pos()) else {
            return;
        };
        let grid = self.project.grid();
        let size = vec2(grid.sprint_width as f32, grid.row_height as f32);
        let fill = parse_hex_color(palette_color(self.project.epics().len()))
            .unwrap_or(Color32::GRAY);
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("epic_drag_preview"),
        ));
        render::paint_preview(&painter, Rect::from_center_size(pointer, size), fill);
        ctx.request_repaint();
    }

    fn show_rename_window(&mut self, ctx: &egui::Context) {
        let Some(mut rename) = self.rename.take() else {
            return;
        };
        let mut open = true;
        egui::Window::new("Edit Epic Name")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let edit = ui.text_edit_singleline(&mut rename.buffer);
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        if let Err(err) = self.project.rename_epic(rename.id, &rename.buffer) {
                            log::debug!("rename ignored: {err}");
                        }
                        open = false;
                    }
                    if ui.button("Cancel").clicked() {
                        open = false;
                    }
                });
            });
        if open {
            self.rename = Some(rename);
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notice.clone() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.notice = None;
                }
            });
    }

    fn export_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Ganttris project", &[EXPORT_EXTENSION])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        {
            if let Err(err) = persistence::write_export(&path, &self.project.export_document()) {
                log::error!("export to {} failed: {err}", path.display());
                self.notice = Some(err.user_message());
            }
        }
    }

    fn import_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Ganttris project", &[EXPORT_EXTENSION, "json"])
            .pick_file()
        {
            match persistence::read_import(&path) {
                Ok(document) => {
                    self.interaction.end(&mut self.project);
                    self.project.import_document(document);
                    self.sync_title();
                }
                Err(err) => {
                    log::error!("import from {} failed: {err}", path.display());
                    self.notice = Some(err.user_message());
                }
            }
        }
    }
}

impl eframe::App for GanttrisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_toolbar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_title(ui);
            ui.separator();
            self.show_timeline(ui);
        });

        self.paint_toolbar_drag_preview(ctx);
        self.show_rename_window(ctx);
        self.show_notice(ctx);

        if self.project.revision() != self.last_revision {
            self.last_revision = self.project.revision();
            ctx.request_repaint();
        }
    }
}
