use crate::error::FontError;
use crate::font::Font;
use glam::{Vec2, Vec3};
use lyon_path::Path;
use lyon_path::math::Point;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
use serde::{Deserialize, Serialize};
use steelcube_scene::MeshData;

/// Shape of the extruded text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGeometryParams {
    /// Em size in world units.
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    /// Maximum distance between a curve and its flattened polyline.
    pub tolerance: f32,
}

impl Default for TextGeometryParams {
    fn default() -> Self {
        Self {
            size: 0.3,
            depth: 0.05,
            tolerance: 0.002,
        }
    }
}

/// Extrude `text` into a closed mesh centered on its bounding box.
///
/// The front cap faces +Z, the back cap faces -Z and side walls face away
/// from the filled glyph area. Depth spans `-depth/2..depth/2` after centering.
pub fn build_text_mesh(
    font: &Font,
    text: &str,
    params: &TextGeometryParams,
) -> Result<MeshData, FontError> {
    let _span = tracing::info_span!("build_text_mesh", chars = text.chars().count()).entered();

    let mut builder = Path::builder();
    let drawn = font.outline_text(text, params.size, &mut builder)?;
    if drawn == 0 {
        return Err(FontError::EmptyText);
    }
    let path = builder.build();
    let tolerance = params.tolerance.max(1e-5);

    let contours = flatten_contours(&path, tolerance);
    let mut mesh = MeshData::default();
    add_caps(&mut mesh, &path, tolerance, params.depth)?;
    add_walls(&mut mesh, &contours, params.depth, params.size);
    if mesh.is_empty() {
        return Err(FontError::EmptyText);
    }

    let offset = mesh.center();
    tracing::debug!(
        triangles = mesh.triangle_count(),
        contours = contours.len(),
        ?offset,
        "text mesh built"
    );
    Ok(mesh)
}

/// Closed polylines, one per subpath, without a repeated closing point.
fn flatten_contours(path: &Path, tolerance: f32) -> Vec<Vec<Vec2>> {
    let mut contours = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let to_vec = |p: Point| Vec2::new(p.x, p.y);

    for event in path.iter() {
        match event {
            lyon_path::Event::Begin { at } => {
                current = vec![to_vec(at)];
            }
            lyon_path::Event::Line { to, .. } => current.push(to_vec(to)),
            lyon_path::Event::Quadratic { from, ctrl, to } => {
                let seg = lyon_geom::QuadraticBezierSegment { from, ctrl, to };
                seg.for_each_flattened(tolerance, &mut |ls: &lyon_geom::LineSegment<f32>| {
                    current.push(to_vec(ls.to));
                });
            }
            lyon_path::Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let seg = lyon_geom::CubicBezierSegment {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                };
                seg.for_each_flattened(tolerance, &mut |ls: &lyon_geom::LineSegment<f32>| {
                    current.push(to_vec(ls.to));
                });
            }
            lyon_path::Event::End { .. } => {
                let mut contour = std::mem::take(&mut current);
                contour.dedup_by(|a, b| a.distance_squared(*b) < 1e-12);
                if contour.len() > 1
                    && contour[0].distance_squared(contour[contour.len() - 1]) < 1e-12
                {
                    contour.pop();
                }
                if contour.len() >= 3 {
                    contours.push(contour);
                }
            }
        }
    }
    contours
}

/// Front cap at `z = depth` facing +Z, back cap at `z = 0` facing -Z.
fn add_caps(
    mesh: &mut MeshData,
    path: &Path,
    tolerance: f32,
    depth: f32,
) -> Result<(), FontError> {
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    let mut tess = FillTessellator::new();
    tess.tessellate_path(
        path.as_slice(),
        &FillOptions::tolerance(tolerance),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position()),
    )
    .map_err(|e| FontError::Tessellation(format!("{e:?}")))?;

    for (z, normal) in [(depth, [0.0, 0.0, 1.0]), (0.0, [0.0, 0.0, -1.0])] {
        let base = mesh.positions.len() as u32;
        for p in &buffers.vertices {
            mesh.positions.push([p.x, p.y, z]);
            mesh.normals.push(normal);
        }
        let facing_up = normal[2] > 0.0;
        for tri in buffers.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| buffers.vertices[i as usize]);
            let area = (b - a).cross(c - a);
            if (area > 0.0) == facing_up {
                mesh.indices
                    .extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
            } else {
                mesh.indices
                    .extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
            }
        }
    }
    Ok(())
}

/// One flat-shaded quad per contour edge, spanning `0..depth`.
fn add_walls(mesh: &mut MeshData, contours: &[Vec<Vec2>], depth: f32, size: f32) {
    let probe = (size * 1e-4).max(1e-6);
    for contour in contours {
        for (i, &p0) in contour.iter().enumerate() {
            let p1 = contour[(i + 1) % contour.len()];
            let edge = p1 - p0;
            let len = edge.length();
            if len < 1e-6 {
                continue;
            }
            let mut normal = Vec2::new(edge.y, -edge.x) / len;
            let mid = (p0 + p1) * 0.5;
            let flipped = contains(contours, mid + normal * probe);
            if flipped {
                normal = -normal;
            }

            let base = mesh.positions.len() as u32;
            let n3 = Vec3::new(normal.x, normal.y, 0.0).to_array();
            for (p, z) in [(p0, 0.0), (p1, 0.0), (p1, depth), (p0, depth)] {
                mesh.positions.push([p.x, p.y, z]);
                mesh.normals.push(n3);
            }
            if flipped {
                mesh.indices
                    .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
            } else {
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
    }
}

/// Even-odd point containment over all contours.
fn contains(contours: &[Vec<Vec2>], point: Vec2) -> bool {
    let mut inside = false;
    for contour in contours {
        let mut j = contour.len() - 1;
        for i in 0..contour.len() {
            let (a, b) = (contour[i], contour[j]);
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::test_typeface_json;

    fn font() -> Font {
        Font::from_bytes(test_typeface_json().into_bytes()).unwrap()
    }

    fn params() -> TextGeometryParams {
        TextGeometryParams {
            size: 1.0,
            depth: 0.2,
            tolerance: 0.01,
        }
    }

    fn assert_winding_matches_normals(mesh: &MeshData) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.positions[i as usize]));
            let n = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!((b - a).cross(c - a).dot(n) > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn extrudes_ring_glyph() {
        let mesh = build_text_mesh(&font(), "O", &params()).unwrap();
        // 8 wall quads plus two caps.
        assert!(mesh.triangle_count() > 16);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn mesh_is_centered_with_requested_depth() {
        let mesh = build_text_mesh(&font(), "O", &params()).unwrap();
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo + hi).length() < 1e-5);
        assert!((hi.z - lo.z - 0.2).abs() < 1e-5);
        assert!((hi.x - lo.x - 0.8).abs() < 1e-5);
    }

    #[test]
    fn hole_walls_face_into_the_hole() {
        let mesh = build_text_mesh(&font(), "O", &params()).unwrap();
        // Inner wall at x = 0.2 before centering (-0.2 after) faces +X.
        let inner = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .find(|(p, n)| (p[0] + 0.2).abs() < 1e-5 && n[0].abs() > 0.5)
            .unwrap();
        assert!(inner.1[0] > 0.0);
        let outer = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .find(|(p, n)| (p[0] + 0.4).abs() < 1e-5 && n[0].abs() > 0.5)
            .unwrap();
        assert!(outer.1[0] < 0.0);
    }

    #[test]
    fn curved_glyph_winds_outward() {
        let mesh = build_text_mesh(&font(), "C", &params()).unwrap();
        assert!(!mesh.is_empty());
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn blank_text_is_an_error() {
        assert!(matches!(
            build_text_mesh(&font(), "", &params()),
            Err(FontError::EmptyText)
        ));
        assert!(matches!(
            build_text_mesh(&font(), "  \n ", &params()),
            Err(FontError::EmptyText)
        ));
    }

    #[test]
    fn newline_stacks_lines() {
        let one = build_text_mesh(&font(), "O", &params()).unwrap();
        let two = build_text_mesh(&font(), "O\nO", &params()).unwrap();
        let height = |m: &MeshData| {
            let (lo, hi) = m.bounds().unwrap();
            hi.y - lo.y
        };
        // Line height is (800 + 200 + 50) / 1000.
        assert!((height(&two) - height(&one) - 1.05).abs() < 1e-4);
    }

    #[test]
    fn contains_respects_holes() {
        let outer = vec![
            Vec2::ZERO,
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        let hole = vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 1.0),
        ];
        let contours = vec![outer, hole];
        assert!(contains(&contours, Vec2::new(0.5, 0.5)));
        assert!(!contains(&contours, Vec2::new(2.0, 2.0)));
        assert!(!contains(&contours, Vec2::new(5.0, 2.0)));
    }
}
