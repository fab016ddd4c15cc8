//! Interactive 3D cube viewer using kiss3d.

use std::collections::VecDeque;
use std::time::Instant;

use kiss3d::prelude::*;

use cubelets::geometry::{Face, SliceName};
use cubelets::pieces::Color as StickerColor;
use cubelets::{AnimationConfig, Cube, CubeError, Cubelet, Directive, MoveExecutor, Renderer, Solver};

/// Size of the black body of each cubelet (slightly smaller than 1.0 for visible gaps).
const BODY_SIZE: f32 = 0.94;
/// Side length of a sticker tile.
const STICKER_SIZE: f32 = 0.8;
/// Thickness of a sticker tile along its normal.
const STICKER_DEPTH: f32 = 0.04;
/// Distance from a cubelet's center to its sticker tiles.
const STICKER_OFFSET: f32 = 0.48;

const TITLE: &str = "Cube - [Space] solve, [U/D/F/B/L/R] turn";

fn sticker_color(color: StickerColor) -> Color {
    match color {
        StickerColor::White => Color::new(0.95, 0.95, 0.95, 1.0),
        StickerColor::Red => Color::new(0.8, 0.1, 0.1, 1.0),
        StickerColor::Green => Color::new(0.1, 0.7, 0.2, 1.0),
        StickerColor::Yellow => Color::new(1.0, 0.85, 0.1, 1.0),
        StickerColor::Orange => Color::new(1.0, 0.5, 0.1, 1.0),
        StickerColor::Blue => Color::new(0.1, 0.3, 0.9, 1.0),
    }
}

fn to_vec3(v: glam::DVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

/// World axis (0 = x, 1 = y, 2 = z) a normal points along most.
fn dominant_axis(normal: glam::DVec3) -> usize {
    let abs = normal.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    }
}

struct RenderedSticker {
    node: SceneNode3d,
    local_face: Face,
    color: StickerColor,
    /// Axis the tile is thin along.
    axis: usize,
}

struct RenderedCubelet {
    body: SceneNode3d,
    stickers: Vec<RenderedSticker>,
}

fn add_sticker(scene: &mut SceneNode3d, axis: usize, color: StickerColor) -> SceneNode3d {
    let mut size = [STICKER_SIZE; 3];
    size[axis] = STICKER_DEPTH;
    scene
        .add_cube(size[0], size[1], size[2])
        .set_color(sticker_color(color))
        .set_position(Vec3::ZERO)
}

/// Draws cubelets as boxes with colored tiles and follows their transforms.
///
/// Tiles are axis-aligned boxes; a tile whose normal swings onto another axis
/// is rebuilt with the matching shape.
pub struct SceneRenderer {
    scene: SceneNode3d,
    cubelets: Vec<RenderedCubelet>,
}

impl SceneRenderer {
    pub fn new(cube: &Cube) -> Self {
        let mut scene = SceneNode3d::empty();
        scene
            .add_light(Light::point(100.0))
            .set_position(Vec3::new(5.0, 6.0, 7.0));

        let mut cubelets = Vec::with_capacity(cube.cubelets().len());
        for cubelet in cube.cubelets() {
            let body = scene
                .add_cube(BODY_SIZE, BODY_SIZE, BODY_SIZE)
                .set_color(Color::new(0.05, 0.05, 0.05, 1.0))
                .set_position(to_vec3(cubelet.world_center()));
            let stickers = cubelet
                .stickers()
                .map(|(local_face, color)| {
                    let axis = dominant_axis(cubelet.world_normal(local_face));
                    RenderedSticker {
                        node: add_sticker(&mut scene, axis, color),
                        local_face,
                        color,
                        axis,
                    }
                })
                .collect();
            cubelets.push(RenderedCubelet { body, stickers });
        }

        let mut renderer = Self { scene, cubelets };
        renderer.render(cube.cubelets());
        renderer
    }

    pub fn scene_mut(&mut self) -> &mut SceneNode3d {
        &mut self.scene
    }
}

impl Renderer for SceneRenderer {
    fn render(&mut self, cubelets: &[Cubelet]) {
        for (rendered, cubelet) in self.cubelets.iter_mut().zip(cubelets) {
            let center = cubelet.world_center();
            rendered.body.set_position(to_vec3(center));

            for sticker in &mut rendered.stickers {
                let normal = cubelet.world_normal(sticker.local_face);
                let axis = dominant_axis(normal);
                if axis != sticker.axis {
                    sticker.node.remove();
                    sticker.node = add_sticker(&mut self.scene, axis, sticker.color);
                    sticker.axis = axis;
                }
                let offset = normal * f64::from(STICKER_OFFSET);
                sticker.node.set_position(to_vec3(center + offset));
            }
        }
    }
}

fn key_face(key: kiss3d::event::Key) -> Option<Face> {
    use kiss3d::event::Key;
    match key {
        Key::U => Some(Face::Up),
        Key::D => Some(Face::Down),
        Key::F => Some(Face::Front),
        Key::B => Some(Face::Back),
        Key::L => Some(Face::Left),
        Key::R => Some(Face::Right),
        _ => None,
    }
}

/// Shows the cube in an interactive 3D viewer.
pub fn display(cube: Cube, config: AnimationConfig) -> Result<(), CubeError> {
    pollster::block_on(display_async(cube, config))
}

async fn display_async(cube: Cube, config: AnimationConfig) -> Result<(), CubeError> {
    let mut window = Window::new(TITLE).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(9.0);

    let renderer = SceneRenderer::new(&cube);
    let mut executor = MoveExecutor::new(cube, renderer, config);
    // directives left to play from the last solve request
    let mut solution: VecDeque<Directive> = VecDeque::new();
    let mut last_frame = Instant::now();

    loop {
        let mut solve_requested = false;
        let mut turns = Vec::new();
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    if key == Key::Space {
                        solve_requested = true;
                    } else if let Some(face) = key_face(key) {
                        turns.push(face);
                    }
                }
            }
        }

        if solve_requested && solution.is_empty() {
            solution = plan_solution(executor.cube())?.into();
            window.set_title(&format!("Solving: {} moves", solution.len()));
        }
        for face in turns {
            if !solution.is_empty() {
                log::debug!("ignoring manual {face} turn while a solution plays");
                continue;
            }
            // dropped by the executor if a turn is still animating
            executor.begin_rotation(Directive::clockwise(SliceName::Face(face)))?;
        }

        let now = Instant::now();
        executor.advance(now - last_frame);
        last_frame = now;

        if !executor.is_animating() {
            if let Some(directive) = solution.pop_front() {
                executor.begin_rotation(directive)?;
                if solution.is_empty() {
                    window.set_title(TITLE);
                }
            }
        }

        if !window
            .render_3d(executor.renderer_mut().scene_mut(), &mut camera)
            .await
        {
            break;
        }
    }
    Ok(())
}

/// Solves a headless copy of the cube and returns the moves to replay.
fn plan_solution(cube: &Cube) -> Result<Vec<Directive>, CubeError> {
    let mut headless = MoveExecutor::new(cube.clone(), cubelets::Headless, AnimationConfig::instant());
    let report = Solver::new(&mut headless).solve()?;
    log::info!("replaying {} moves", report.move_count());
    Ok(report.moves)
}
