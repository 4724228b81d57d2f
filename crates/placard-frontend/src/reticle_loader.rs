//! Asynchronous placement-cursor loading
//!
//! The cursor mesh loads off the frame callback and is delivered through a
//! shared slot; the app applies it whenever it shows up. Until then the
//! frame callback tolerates a missing cursor and simply draws none. When
//! no model file is present a procedurally generated flat ring stands in.

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use placard_renderer::ReticleVertex;

const RING_INNER_RADIUS: f32 = 0.06;
const RING_OUTER_RADIUS: f32 = 0.09;
const RING_SEGMENTS: u32 = 48;

/// Shared hand-off slot for the loaded cursor mesh
pub type ReticleSlot = Arc<Mutex<Option<Vec<ReticleVertex>>>>;

/// Begin loading the cursor model; the result appears in the returned slot
/// on a later frame.
pub fn spawn_load(path: PathBuf) -> ReticleSlot {
    let slot: ReticleSlot = Arc::new(Mutex::new(None));

    #[cfg(not(target_arch = "wasm32"))]
    {
        let out = slot.clone();
        std::thread::spawn(move || {
            *out.lock() = Some(load_mesh(&path));
        });
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = path;
        *slot.lock() = Some(generate_ring(
            RING_INNER_RADIUS,
            RING_OUTER_RADIUS,
            RING_SEGMENTS,
        ));
    }

    slot
}

#[cfg(not(target_arch = "wasm32"))]
fn load_mesh(path: &Path) -> Vec<ReticleVertex> {
    match load_stl(path) {
        Ok(vertices) => {
            tracing::info!(?path, vertices = vertices.len(), "reticle model loaded");
            vertices
        }
        Err(e) => {
            tracing::warn!(?path, error = %e, "reticle model unavailable, using built-in ring");
            generate_ring(RING_INNER_RADIUS, RING_OUTER_RADIUS, RING_SEGMENTS)
        }
    }
}

/// Load an STL cursor model as flat-shaded triangle soup
#[cfg(not(target_arch = "wasm32"))]
fn load_stl(path: &Path) -> std::io::Result<Vec<ReticleVertex>> {
    use std::io::BufReader;

    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mesh = stl_io::read_stl(&mut reader)?;

    let mut vertices = Vec::with_capacity(mesh.faces.len() * 3);
    for face in &mesh.faces {
        let normal = [face.normal[0], face.normal[1], face.normal[2]];
        for &index in &face.vertices {
            let v = mesh.vertices[index];
            vertices.push(ReticleVertex {
                position: [v[0], v[1], v[2]],
                normal,
            });
        }
    }
    Ok(vertices)
}

/// Flat ring in the ground plane, facing up
fn generate_ring(inner: f32, outer: f32, segments: u32) -> Vec<ReticleVertex> {
    let normal = [0.0, 1.0, 0.0];
    let mut vertices = Vec::with_capacity(segments as usize * 6);

    for seg in 0..segments {
        let a0 = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
        let a1 = 2.0 * std::f32::consts::PI * (seg + 1) as f32 / segments as f32;
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();

        let inner0 = [inner * c0, 0.0, inner * s0];
        let outer0 = [outer * c0, 0.0, outer * s0];
        let inner1 = [inner * c1, 0.0, inner * s1];
        let outer1 = [outer * c1, 0.0, outer * s1];

        for position in [inner0, outer0, inner1, inner1, outer0, outer1] {
            vertices.push(ReticleVertex { position, normal });
        }
    }

    vertices
}
