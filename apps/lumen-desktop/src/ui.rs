use glam::{Vec2, Vec3};
use lumen_assets::TextureHandle;
use lumen_scene::{MaterialHandle, Scene, ShadingModel};
use lumen_tools::{FrameStats, SceneInspector};
use std::collections::{HashMap, VecDeque};

const DRAG_SPEED: f32 = 0.05;
const PREVIEW_SIZE: f32 = 64.0;

/// Per-frame data the editor shows but does not own.
pub struct FrameInfo<'a> {
    pub window_size: (u32, u32),
    pub stats: &'a FrameStats,
    pub previews: &'a HashMap<TextureHandle, egui::TextureId>,
}

/// The "Info" editor window and its helper windows.
pub struct EditorUi {
    pub visible: bool,
    show_settings: bool,
    show_inspection: bool,
    title_bar: bool,
    locked: bool,
}

impl Default for EditorUi {
    fn default() -> Self {
        Self {
            visible: true,
            show_settings: false,
            show_inspection: false,
            title_bar: true,
            locked: false,
        }
    }
}

fn drag_vec3(ui: &mut egui::Ui, label: &str, value: Vec3) -> Option<Vec3> {
    let mut v = value.to_array();
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for (prefix, c) in ["X: ", "Y: ", "Z: "].into_iter().zip(v.iter_mut()) {
            changed |= ui
                .add(egui::DragValue::new(c).prefix(prefix).speed(DRAG_SPEED))
                .changed();
        }
    });
    changed.then(|| Vec3::from(v))
}

fn drag_vec2(ui: &mut egui::Ui, label: &str, value: Vec2) -> Option<Vec2> {
    let mut v = value.to_array();
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for (prefix, c) in ["U: ", "V: "].into_iter().zip(v.iter_mut()) {
            changed |= ui
                .add(egui::DragValue::new(c).prefix(prefix).speed(DRAG_SPEED))
                .changed();
        }
    });
    changed.then(|| Vec2::from(v))
}

fn bar_graph(ui: &mut egui::Ui, values: &VecDeque<f32>, caption: String) {
    let peak = FrameStats::peak(values).max(1e-3);
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 40.0),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
    let bar_width = rect.width() / values.len().max(1) as f32;
    let fill = ui.visuals().selection.bg_fill;
    for (i, v) in values.iter().enumerate() {
        let height = rect.height() * (v / peak);
        let left = rect.left() + i as f32 * bar_width;
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(left, rect.bottom() - height),
                egui::pos2(left + bar_width * 0.8, rect.bottom()),
            ),
            0.0,
            fill,
        );
    }
    ui.label(caption);
}

impl EditorUi {
    pub fn show(&mut self, ctx: &egui::Context, scene: &mut Scene, info: &FrameInfo<'_>) {
        if !self.visible {
            return;
        }

        egui::Window::new("Info")
            .default_width(320.0)
            .title_bar(self.title_bar)
            .movable(!self.locked)
            .resizable(!self.locked)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::CollapsingHeader::new("General")
                        .default_open(true)
                        .show(ui, |ui| self.general(ui, scene, info));
                    egui::CollapsingHeader::new("Camera").show(ui, |ui| cameras(ui, scene));
                    egui::CollapsingHeader::new("Lights").show(ui, |ui| lights(ui, scene));
                    egui::CollapsingHeader::new("Entities").show(ui, |ui| entities(ui, scene));
                    egui::CollapsingHeader::new("Materials")
                        .show(ui, |ui| materials(ui, scene, info.previews));
                    egui::CollapsingHeader::new("Meshes").show(ui, |ui| meshes(ui, scene));
                });
            });

        if self.show_settings {
            egui::Window::new("Settings")
                .open(&mut self.show_settings)
                .show(ctx, |ui| ctx.settings_ui(ui));
        }
        if self.show_inspection {
            egui::Window::new("Inspection")
                .open(&mut self.show_inspection)
                .show(ctx, |ui| ctx.inspection_ui(ui));
        }
    }

    fn general(&mut self, ui: &mut egui::Ui, scene: &mut Scene, info: &FrameInfo<'_>) {
        ui.label(format!(
            "Window: {} x {}",
            info.window_size.0, info.window_size.1
        ));
        ui.label(SceneInspector::summary(scene).to_string());

        bar_graph(
            ui,
            info.stats.framerate(),
            format!("Framerate: {:.0} fps", info.stats.latest_fps()),
        );
        bar_graph(
            ui,
            info.stats.frame_ms(),
            format!("Frame time: {:.2} ms", info.stats.latest_ms()),
        );

        let mut clear = scene.clear_color().to_array();
        ui.horizontal(|ui| {
            ui.label("Background");
            if ui.color_edit_button_rgba_unmultiplied(&mut clear).changed() {
                scene.set_clear_color(clear.into());
            }
        });

        ui.checkbox(&mut self.show_settings, "Show settings window");
        ui.checkbox(&mut self.show_inspection, "Show inspection window");
        ui.checkbox(&mut self.title_bar, "Title bar");
        ui.checkbox(&mut self.locked, "Lock window");
        ui.small("F1: toggle UI | Tab: next camera | LMB: look | WASD/QE: move");
    }
}

fn cameras(ui: &mut egui::Ui, scene: &mut Scene) {
    let active = scene.active_camera_index();
    let mut make_current = None;
    for (i, camera) in scene.cameras_mut().iter_mut().enumerate() {
        egui::CollapsingHeader::new(format!("Camera {i}"))
            .id_salt(("camera", i))
            .default_open(i == active)
            .show(ui, |ui| {
                if i == active {
                    ui.label("Current");
                } else if ui.button("Make Current").clicked() {
                    make_current = Some(i);
                }
                if let Some(p) = drag_vec3(ui, "Position", camera.position()) {
                    camera.transform_mut().set_position(p);
                }
                if let Some(r) = drag_vec3(ui, "Rotation", camera.transform().rotation()) {
                    camera.transform_mut().set_rotation(r);
                }
                ui.label(format!(
                    "FOV {:.0} deg, aspect {:.2}, {:?}",
                    camera.fov().to_degrees(),
                    camera.aspect(),
                    camera.projection()
                ));
            });
    }
    if let Some(i) = make_current {
        if let Err(e) = scene.set_active_camera(i) {
            tracing::warn!("{e}");
        }
    }
}

fn lights(ui: &mut egui::Ui, scene: &mut Scene) {
    let mut ambient = scene.ambient().to_array();
    ui.horizontal(|ui| {
        ui.label("Ambient");
        if ui.color_edit_button_rgb(&mut ambient).changed() {
            scene.set_ambient(ambient.into());
        }
    });

    for (i, light) in scene.lights_mut().iter_mut().enumerate() {
        egui::CollapsingHeader::new(format!("Light {i} ({})", light.kind.label()))
            .id_salt(("light", i))
            .show(ui, |ui| {
                ui.add(
                    egui::DragValue::new(&mut light.intensity)
                        .prefix("Intensity: ")
                        .speed(DRAG_SPEED)
                        .range(0.0..=f32::MAX),
                );
                let mut color = light.color.to_array();
                ui.horizontal(|ui| {
                    ui.label("Color");
                    if ui.color_edit_button_rgb(&mut color).changed() {
                        light.color = color.into();
                    }
                });
                if light.kind.uses_direction() {
                    if let Some(d) = drag_vec3(ui, "Direction", light.direction) {
                        light.direction = d;
                    }
                }
                if light.kind.uses_position() {
                    if let Some(p) = drag_vec3(ui, "Position", light.position) {
                        light.position = p;
                    }
                    ui.add(
                        egui::DragValue::new(&mut light.range)
                            .prefix("Range: ")
                            .speed(DRAG_SPEED)
                            .range(0.0..=f32::MAX),
                    );
                }
                if light.kind == lumen_scene::LightKind::Spot {
                    let mut inner = light.spot_inner_angle.to_degrees();
                    let mut outer = light.spot_outer_angle.to_degrees();
                    ui.horizontal(|ui| {
                        if ui
                            .add(egui::DragValue::new(&mut inner).prefix("Inner: ").suffix(" deg").speed(DRAG_SPEED).range(0.0..=180.0))
                            .changed()
                        {
                            light.spot_inner_angle = inner.to_radians();
                        }
                        if ui
                            .add(egui::DragValue::new(&mut outer).prefix("Outer: ").suffix(" deg").speed(DRAG_SPEED).range(0.0..=180.0))
                            .changed()
                        {
                            light.spot_outer_angle = outer.to_radians();
                        }
                    });
                }
            });
    }
}

fn entities(ui: &mut egui::Ui, scene: &mut Scene) {
    for (id, entity) in scene.entities_mut() {
        egui::CollapsingHeader::new(format!("{} {}", entity.name, id))
            .id_salt(("entity", id.0))
            .show(ui, |ui| {
                let t = &mut entity.transform;
                if let Some(p) = drag_vec3(ui, "Position", t.position()) {
                    t.set_position(p);
                }
                if let Some(r) = drag_vec3(ui, "Rotation", t.rotation()) {
                    t.set_rotation(r);
                }
                if let Some(s) = drag_vec3(ui, "Scale", t.scale()) {
                    t.set_scale(s);
                }
            });
    }
}

fn materials(
    ui: &mut egui::Ui,
    scene: &mut Scene,
    previews: &HashMap<TextureHandle, egui::TextureId>,
) {
    let handles: Vec<MaterialHandle> = scene.materials().map(|(h, _)| h).collect();
    for handle in handles {
        let Some(material) = scene.material_mut(handle) else {
            continue;
        };
        egui::CollapsingHeader::new(material.name.clone())
            .id_salt(("material", handle.0))
            .show(ui, |ui| {
                let mut shading = material.shading();
                egui::ComboBox::from_id_salt(("shading", handle.0))
                    .selected_text(shading.label())
                    .show_ui(ui, |ui| {
                        for model in ShadingModel::ALL {
                            ui.selectable_value(&mut shading, model, model.label());
                        }
                    });
                if shading != material.shading() {
                    material.set_shading(shading);
                }

                let mut tint = material.color_tint().to_array();
                ui.horizontal(|ui| {
                    ui.label("Tint");
                    if ui.color_edit_button_rgba_unmultiplied(&mut tint).changed() {
                        material.set_color_tint(tint.into());
                    }
                });
                if let Some(s) = drag_vec2(ui, "UV scale", material.uv_scale()) {
                    material.set_uv_scale(s);
                }
                if let Some(o) = drag_vec2(ui, "UV offset", material.uv_offset()) {
                    material.set_uv_offset(o);
                }
                let mut roughness = material.roughness();
                if ui
                    .add(egui::Slider::new(&mut roughness, 0.0..=1.0).text("Roughness"))
                    .changed()
                {
                    material.set_roughness(roughness);
                }

                ui.horizontal(|ui| {
                    for (slot, texture) in material.textures() {
                        ui.vertical(|ui| {
                            ui.label(slot.label());
                            match previews.get(&texture) {
                                Some(id) => {
                                    ui.add(egui::Image::new(egui::load::SizedTexture::new(
                                        *id,
                                        egui::vec2(PREVIEW_SIZE, PREVIEW_SIZE),
                                    )));
                                }
                                None => {
                                    ui.label("(no preview)");
                                }
                            }
                        });
                    }
                });
            });
    }
}

fn meshes(ui: &mut egui::Ui, scene: &Scene) {
    for stats in SceneInspector::mesh_stats(scene) {
        ui.label(stats.to_string());
    }
}
